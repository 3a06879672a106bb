//! End-to-end rotation tests against the in-memory collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use rotator::{CredentialProbe, ProbeError, RotationHandler, Rotator};
use rotator_core::{RotationEvent, RotationStep, SecretPayload, VersionStage};
use rotator_iam::{
    CredentialAuthority, CredentialMetadata, CredentialStatus, IamError,
    MemoryCredentialAuthority, ServiceSpecificCredential,
};
use rotator_lambda::{Handler, LambdaContext};
use rotator_secretsmanager::{
    MemorySecretStore, SecretDescription, SecretStore, SecretValue, SecretsManagerError,
};

const SECRET: &str = "codecommit/git-user";
const USER: &str = "git-user";
const SERVICE: &str = "codecommit.amazonaws.com";

// =============================================================================
// TEST COLLABORATORS
// =============================================================================

/// Memory store whose writes can be made to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemorySecretStore,
    fail_puts: AtomicBool,
}

#[async_trait]
impl SecretStore for FlakyStore {
    async fn describe_secret(&self, secret_id: &str) -> Result<SecretDescription, SecretsManagerError> {
        self.inner.describe_secret(secret_id).await
    }

    async fn get_secret_value(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
        version_stage: Option<&VersionStage>,
    ) -> Result<SecretValue, SecretsManagerError> {
        self.inner
            .get_secret_value(secret_id, version_id, version_stage)
            .await
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        version_stages: &[VersionStage],
    ) -> Result<String, SecretsManagerError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(SecretsManagerError::Service("throttled".to_string()));
        }
        self.inner
            .put_secret_value(secret_id, client_request_token, secret_string, version_stages)
            .await
    }

    async fn update_secret_version_stage(
        &self,
        secret_id: &str,
        version_stage: &VersionStage,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), SecretsManagerError> {
        self.inner
            .update_secret_version_stage(
                secret_id,
                version_stage,
                move_to_version_id,
                remove_from_version_id,
            )
            .await
    }

    async fn rotate_secret(
        &self,
        secret_id: &str,
        client_request_token: &str,
    ) -> Result<(), SecretsManagerError> {
        SecretStore::rotate_secret(&self.inner, secret_id, client_request_token).await
    }

    async fn get_random_password(
        &self,
        password_length: Option<u32>,
        exclude_characters: &str,
    ) -> Result<String, SecretsManagerError> {
        self.inner
            .get_random_password(password_length, exclude_characters)
            .await
    }
}

/// Memory authority that counts issues and deletions
#[derive(Default)]
struct CountingAuthority {
    inner: MemoryCredentialAuthority,
    created: AtomicUsize,
    deleted: AtomicUsize,
    failing_deletes: AtomicUsize,
}

#[async_trait]
impl CredentialAuthority for CountingAuthority {
    async fn create_service_specific_credential(
        &self,
        user_name: &str,
        service_name: &str,
    ) -> Result<ServiceSpecificCredential, IamError> {
        let credential = self
            .inner
            .create_service_specific_credential(user_name, service_name)
            .await?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(credential)
    }

    async fn list_service_specific_credentials(
        &self,
        user_name: &str,
        service_name: Option<&str>,
    ) -> Result<Vec<CredentialMetadata>, IamError> {
        self.inner
            .list_service_specific_credentials(user_name, service_name)
            .await
    }

    async fn delete_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<(), IamError> {
        let failing = self.failing_deletes.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_deletes.store(failing - 1, Ordering::SeqCst);
            return Err(IamError::Service("rate exceeded".to_string()));
        }
        self.inner
            .delete_service_specific_credential(user_name, credential_id)
            .await?;
        self.deleted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reset_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<ServiceSpecificCredential, IamError> {
        self.inner
            .reset_service_specific_credential(user_name, credential_id)
            .await
    }

    async fn update_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
        status: CredentialStatus,
    ) -> Result<(), IamError> {
        self.inner
            .update_service_specific_credential(user_name, credential_id, status)
            .await
    }
}

/// Probe with a switchable verdict
#[derive(Default)]
struct SwitchProbe {
    reject: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl CredentialProbe for SwitchProbe {
    async fn probe(&self, url: &str, _payload: &SecretPayload) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject.load(Ordering::SeqCst) {
            Err(ProbeError::Rejected {
                url: url.to_string(),
                status: 401,
            })
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// HARNESS
// =============================================================================

struct Harness {
    store: Arc<FlakyStore>,
    authority: Arc<CountingAuthority>,
    probe: Arc<SwitchProbe>,
    rotator: Rotator,
    /// Version holding the initial credential
    v1: String,
    /// Initial credential id
    c1: String,
}

fn service_tags(extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut tags: HashMap<String, String> = [
        ("rotator:resourceType", "ServiceSpecificCredential"),
        ("rotator:userName", USER),
        ("rotator:serviceName", SERVICE),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        tags.insert(k.to_string(), v.to_string());
    }
    tags
}

async fn harness(tags: HashMap<String, String>) -> Harness {
    let store = Arc::new(FlakyStore::default());
    let authority = Arc::new(CountingAuthority::default());
    let probe = Arc::new(SwitchProbe::default());

    authority.inner.create_user(USER).unwrap();
    let c1 = authority
        .inner
        .create_service_specific_credential(USER, SERVICE)
        .await
        .unwrap();

    let mut payload = SecretPayload {
        username: Some(c1.metadata.service_user_name.clone()),
        password: Some(c1.service_password.clone()),
        service_specific_credential_id: Some(c1.id().to_string()),
        ..Default::default()
    };
    payload
        .attributes
        .insert("url".to_string(), "https://git.example.com/v1/repos/infra".into());

    store
        .inner
        .create_secret(
            SECRET,
            Some("Git credentials".to_string()),
            Some(payload.to_secret_string().unwrap()),
            tags,
        )
        .unwrap();
    store.inner.set_rotation_enabled(SECRET, true).unwrap();

    let v1 = store
        .describe_secret(SECRET)
        .await
        .unwrap()
        .version_with_stage(&VersionStage::Current)
        .unwrap()
        .to_string();

    let rotator = Rotator::new(store.clone(), authority.clone(), probe.clone());

    Harness {
        store,
        authority,
        probe,
        rotator,
        v1,
        c1: c1.id().to_string(),
    }
}

impl Harness {
    /// Stage `token` as the pending placeholder, as the service does
    async fn begin(&self, token: &str) {
        self.rotator.start_rotation(SECRET, token).await.unwrap();
    }

    async fn step(&self, token: &str, step: RotationStep) -> Result<(), rotator_core::RotatorError> {
        self.rotator
            .handle(&RotationEvent::new(SECRET, token, step))
            .await
    }

    async fn describe(&self) -> SecretDescription {
        self.store.describe_secret(SECRET).await.unwrap()
    }

    async fn payload(&self, stage: VersionStage) -> SecretPayload {
        let value = self
            .store
            .get_secret_value(SECRET, None, Some(&stage))
            .await
            .unwrap();
        SecretPayload::from_secret_string(value.secret_string.as_deref().unwrap()).unwrap()
    }

    async fn credential_ids(&self) -> Vec<String> {
        self.authority
            .list_service_specific_credentials(USER, Some(SERVICE))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.service_specific_credential_id)
            .collect()
    }

    async fn current_holders(&self) -> usize {
        self.describe()
            .await
            .versions
            .values()
            .filter(|stages| stages.contains(&VersionStage::Current))
            .count()
    }
}

// =============================================================================
// FULL ROTATIONS
// =============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_rotation_replaces_credential() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;

        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        let pending = h.payload(VersionStage::Pending).await;
        let c2 = pending.credential_id().unwrap().to_string();
        assert_ne!(c2, h.c1);
        assert_eq!(
            pending.attributes["url"],
            "https://git.example.com/v1/repos/infra"
        );
        assert_eq!(h.describe().await.version_with_stage(&VersionStage::Pending), Some("v2"));

        h.step("v2", RotationStep::SetSecret).await.unwrap();
        assert!(h
            .describe()
            .await
            .version_has_stage("v2", &VersionStage::set_marker()));

        h.step("v2", RotationStep::TestSecret).await.unwrap();
        assert_eq!(h.current_holders().await, 1);

        h.step("v2", RotationStep::FinishSecret).await.unwrap();

        let description = h.describe().await;
        assert_eq!(h.current_holders().await, 1);
        assert!(description.version_has_stage("v2", &VersionStage::Current));
        assert!(description.version_has_stage(&h.v1, &VersionStage::Previous));
        assert!(description.version_with_stage(&VersionStage::Pending).is_none());

        assert_eq!(h.credential_ids().await, vec![c2]);
        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_rotations_stay_within_quota() {
        let h = harness(service_tags(&[])).await;

        h.begin("v2").await;
        h.rotator.rotate(SECRET, "v2").await.unwrap();
        h.begin("v3").await;
        h.rotator.rotate(SECRET, "v3").await.unwrap();

        let current = h.payload(VersionStage::Current).await;
        assert_eq!(
            h.credential_ids().await,
            vec![current.credential_id().unwrap().to_string()]
        );
        assert_eq!(h.authority.created.load(Ordering::SeqCst), 2);
        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 2);

        let description = h.describe().await;
        assert!(description.version_has_stage("v3", &VersionStage::Current));
        assert!(description.version_has_stage("v2", &VersionStage::Previous));
        assert!(description.stages_of(&h.v1).is_none());
    }

    #[tokio::test]
    async fn test_random_password_rotation() {
        let tags: HashMap<String, String> = [
            ("rotator:resourceType", "RandomPassword"),
            ("rotator:passwordLength", "24"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let h = harness(tags).await;
        let before = h.payload(VersionStage::Current).await;

        h.begin("v2").await;
        h.rotator.rotate(SECRET, "v2").await.unwrap();

        let after = h.payload(VersionStage::Current).await;
        assert_eq!(after.username, before.username);
        assert_ne!(after.password, before.password);
        assert_eq!(after.password.as_deref().map(str::len), Some(24));

        // Nothing is pushed or revoked for generated passwords
        assert!(h
            .describe()
            .await
            .version_with_stage(&VersionStage::set_marker())
            .is_none());
        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lambda_handler_reports_ok() {
        let h = harness(service_tags(&[])).await;
        let handler = RotationHandler::new(h.rotator.clone());
        h.begin("v2").await;

        let payload = serde_json::json!({
            "SecretId": SECRET,
            "ClientRequestToken": "v2",
            "Step": "createSecret",
        });
        let output = handler
            .call(Bytes::from(payload.to_string()), context())
            .await
            .unwrap();

        assert_eq!(output, serde_json::json!({ "message": "ok" }));
    }
}

// =============================================================================
// IDEMPOTENCY
// =============================================================================

mod idempotency_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_twice_issues_one_credential() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;

        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        let first = h.payload(VersionStage::Pending).await;
        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        let second = h.payload(VersionStage::Pending).await;

        assert_eq!(first, second);
        assert_eq!(h.authority.created.load(Ordering::SeqCst), 1);
        let pending: Vec<_> = h
            .describe()
            .await
            .versions
            .into_iter()
            .filter(|(_, stages)| stages.contains(&VersionStage::Pending))
            .collect();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_set_twice_is_safe() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;

        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        h.step("v2", RotationStep::SetSecret).await.unwrap();
        h.step("v2", RotationStep::SetSecret).await.unwrap();

        assert!(h
            .describe()
            .await
            .version_has_stage("v2", &VersionStage::set_marker()));
    }

    #[tokio::test]
    async fn test_finish_twice_deletes_once() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;
        h.rotator.rotate(SECRET, "v2").await.unwrap();

        h.step("v2", RotationStep::FinishSecret).await.unwrap();

        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 1);
        assert_eq!(h.current_holders().await, 1);
        assert!(h
            .describe()
            .await
            .version_has_stage("v2", &VersionStage::Current));
    }

    #[tokio::test]
    async fn test_finish_retry_completes_failed_revoke() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;
        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        h.step("v2", RotationStep::SetSecret).await.unwrap();
        h.step("v2", RotationStep::TestSecret).await.unwrap();

        h.authority.failing_deletes.store(1, Ordering::SeqCst);
        let err = h.step("v2", RotationStep::FinishSecret).await.unwrap_err();
        assert_eq!(err.error_type(), "FinishFailed");

        // The stage move committed before the revoke failed
        assert!(h
            .describe()
            .await
            .version_has_stage("v2", &VersionStage::Current));
        assert!(h.credential_ids().await.contains(&h.c1));

        h.step("v2", RotationStep::FinishSecret).await.unwrap();
        assert!(!h.credential_ids().await.contains(&h.c1));
        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 1);
        assert!(h
            .describe()
            .await
            .version_with_stage(&VersionStage::revoke_marker())
            .is_none());

        h.step("v2", RotationStep::FinishSecret).await.unwrap();
        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_finish_current_token_keeps_previous_credential() {
        let h = harness(service_tags(&[])).await;
        let c0 = h
            .authority
            .inner
            .create_service_specific_credential(USER, SERVICE)
            .await
            .unwrap();
        let v0 = SecretPayload {
            username: Some(c0.metadata.service_user_name.clone()),
            password: Some(c0.service_password.clone()),
            service_specific_credential_id: Some(c0.id().to_string()),
            ..Default::default()
        };
        h.store
            .put_secret_value(
                SECRET,
                "v0",
                &v0.to_secret_string().unwrap(),
                &[VersionStage::Previous],
            )
            .await
            .unwrap();

        let v1 = h.v1.clone();
        h.step(&v1, RotationStep::FinishSecret).await.unwrap();

        assert_eq!(h.authority.deleted.load(Ordering::SeqCst), 0);
        assert!(h.credential_ids().await.contains(&c0.id().to_string()));
        assert!(h
            .describe()
            .await
            .version_has_stage("v0", &VersionStage::Previous));
    }
}

// =============================================================================
// FAILURES
// =============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_test_before_set_fails() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;
        h.step("v2", RotationStep::CreateSecret).await.unwrap();

        let err = h.step("v2", RotationStep::TestSecret).await.unwrap_err();
        assert_eq!(err.error_type(), "TestFailed");
        assert_eq!(err.secret_id.as_deref(), Some(SECRET));
    }

    #[tokio::test]
    async fn test_set_can_be_skipped_when_not_required() {
        let h = harness(service_tags(&[("rotator:requireSet", "false")])).await;
        h.begin("v2").await;
        h.step("v2", RotationStep::CreateSecret).await.unwrap();

        h.step("v2", RotationStep::TestSecret).await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_failure_leaves_stages_alone() {
        let h = harness(service_tags(&[(
            "rotator:testUrl",
            "https://git.example.com/info/refs",
        )]))
        .await;
        h.begin("v2").await;
        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        h.step("v2", RotationStep::SetSecret).await.unwrap();
        let before = h.describe().await.versions;

        h.probe.reject.store(true, Ordering::SeqCst);
        let err = h.step("v2", RotationStep::TestSecret).await.unwrap_err();

        assert_eq!(err.error_type(), "TestFailed");
        assert_eq!(h.probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.describe().await.versions, before);
        assert!(h
            .describe()
            .await
            .version_has_stage(&h.v1, &VersionStage::Current));
        assert!(h
            .describe()
            .await
            .version_has_stage("v2", &VersionStage::Pending));
    }

    #[tokio::test]
    async fn test_quota_exceeded_stores_nothing() {
        let h = harness(service_tags(&[])).await;
        h.authority
            .inner
            .create_service_specific_credential(USER, SERVICE)
            .await
            .unwrap();
        h.begin("v2").await;

        let err = h.step("v2", RotationStep::CreateSecret).await.unwrap_err();

        assert_eq!(err.error_type(), "QuotaExceeded");
        assert!(!err.is_retryable());
        let pending = h
            .store
            .get_secret_value(SECRET, None, Some(&VersionStage::Pending))
            .await;
        assert!(matches!(pending, Err(e) if e.is_not_found()));
        assert_eq!(h.authority.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reclaim_resets_stale_credential() {
        let h = harness(service_tags(&[("rotator:reclaimStale", "true")])).await;
        let stale = h
            .authority
            .inner
            .create_service_specific_credential(USER, SERVICE)
            .await
            .unwrap();

        h.begin("v2").await;
        h.rotator.rotate(SECRET, "v2").await.unwrap();

        let current = h.payload(VersionStage::Current).await;
        assert_eq!(current.credential_id(), Some(stale.id()));
        assert_ne!(current.password.as_deref(), Some(stale.service_password.as_str()));
        assert_eq!(h.credential_ids().await, vec![stale.id().to_string()]);
    }

    #[tokio::test]
    async fn test_failed_write_revokes_new_credential() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;
        h.store.fail_puts.store(true, Ordering::SeqCst);

        let err = h.step("v2", RotationStep::CreateSecret).await.unwrap_err();

        assert_eq!(err.error_type(), "CreateFailed");
        assert_eq!(h.authority.created.load(Ordering::SeqCst), 1);
        assert_eq!(h.credential_ids().await, vec![h.c1.clone()]);

        h.store.fail_puts.store(false, Ordering::SeqCst);
        h.step("v2", RotationStep::CreateSecret).await.unwrap();
        assert_eq!(h.credential_ids().await.len(), 2);
    }
}

// =============================================================================
// PRECONDITIONS
// =============================================================================

mod precondition_tests {
    use super::*;

    #[tokio::test]
    async fn test_rotation_disabled() {
        let h = harness(service_tags(&[])).await;
        h.store.inner.set_rotation_enabled(SECRET, false).unwrap();

        let err = h.step("v2", RotationStep::CreateSecret).await.unwrap_err();
        assert_eq!(err.error_type(), "PreconditionFailed");
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let h = harness(service_tags(&[])).await;

        let err = h
            .rotator
            .handle(&RotationEvent::new("missing", "v2", RotationStep::CreateSecret))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "PreconditionFailed");
    }

    #[tokio::test]
    async fn test_missing_resource_tags() {
        let h = harness(HashMap::new()).await;

        let err = h.step("v2", RotationStep::CreateSecret).await.unwrap_err();
        assert_eq!(err.error_type(), "PreconditionFailed");
        assert!(err.message.contains("rotator:resourceType"));
    }

    #[tokio::test]
    async fn test_current_token_rejected_before_finish() {
        let h = harness(service_tags(&[])).await;
        let v1 = h.v1.clone();

        for step in [
            RotationStep::CreateSecret,
            RotationStep::SetSecret,
            RotationStep::TestSecret,
        ] {
            let err = h.step(&v1, step).await.unwrap_err();
            assert_eq!(err.error_type(), "PreconditionFailed");
        }
    }

    #[tokio::test]
    async fn test_unstaged_token_rejected() {
        let h = harness(service_tags(&[])).await;

        for step in RotationStep::ALL {
            let err = h.step("v9", step).await.unwrap_err();
            assert_eq!(err.error_type(), "PreconditionFailed");
        }
    }

    #[tokio::test]
    async fn test_unstaged_token_cannot_take_over_rotation() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;
        h.step("v2", RotationStep::CreateSecret).await.unwrap();

        let err = h
            .step("rogue", RotationStep::CreateSecret)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "PreconditionFailed");

        let description = h.describe().await;
        assert_eq!(description.version_with_stage(&VersionStage::Pending), Some("v2"));
        assert!(description.stages_of("rogue").is_none());
        assert_eq!(h.authority.created.load(Ordering::SeqCst), 1);

        h.step("v2", RotationStep::SetSecret).await.unwrap();
    }

    #[tokio::test]
    async fn test_placeholder_without_value_cannot_finish() {
        let h = harness(service_tags(&[])).await;
        h.begin("v2").await;

        let err = h.step("v2", RotationStep::FinishSecret).await.unwrap_err();
        assert_eq!(err.error_type(), "FinishFailed");
        assert!(h
            .describe()
            .await
            .version_has_stage(&h.v1, &VersionStage::Current));
    }

    #[tokio::test]
    async fn test_invalid_step_and_malformed_event() {
        let h = harness(service_tags(&[])).await;
        let handler = RotationHandler::new(h.rotator.clone());

        let unknown = serde_json::json!({
            "SecretId": SECRET,
            "ClientRequestToken": "v2",
            "Step": "rollbackSecret",
        });
        let err = handler
            .call(Bytes::from(unknown.to_string()), context())
            .await
            .unwrap_err();
        assert_eq!(err.error_type, "InvalidStep");

        let err = handler
            .call(Bytes::from_static(b"{not json"), context())
            .await
            .unwrap_err();
        assert_eq!(err.error_type, "InvalidStep");
    }
}

fn context() -> LambdaContext {
    LambdaContext {
        aws_request_id: "c6af9ac6-7b61-11e6-9a41-93e812345678".to_string(),
        invoked_function_arn: "arn:aws:lambda:us-east-1:000000000000:function:rotator".to_string(),
        function_name: "rotator".to_string(),
        function_version: "$LATEST".to_string(),
        memory_limit_in_mb: 128,
        log_group_name: "/aws/lambda/rotator".to_string(),
        log_stream_name: "2024/01/01/[$LATEST]abc".to_string(),
        deadline_ms: i64::MAX,
        trace_id: None,
    }
}
