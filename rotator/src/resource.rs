//! Credential kinds a secret can hold
//!
//! A [`Resource`] knows how to issue, activate, verify and revoke the
//! credential stored in a secret. The rotation steps only deal with secret
//! versions and delegate everything credential-specific to it.

use async_trait::async_trait;
use rotator_core::{RotationStep, RotatorError, SecretPayload};
use rotator_iam::{
    CredentialAuthority, CredentialMetadata, CredentialStatus, IamError,
    ServiceSpecificCredential, MAX_SERVICE_SPECIFIC_CREDENTIALS,
};
use rotator_secretsmanager::{SecretStore, SecretsManagerError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::probe::{CredentialProbe, ProbeError};
use crate::secret_config::{ResourceConfig, ResourceType, RotationConfig};

/// Characters left out of generated passwords
pub const PASSWORD_EXCLUDE_CHARACTERS: &str = "/@\"'\\";

#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("credential quota reached: {0}")]
    QuotaExceeded(String),

    #[error("payload has no service-specific credential id")]
    MissingCredentialId,

    #[error("credential {0} is not listed by the authority")]
    UnknownCredential(String),

    #[error("credential {id} is {status}")]
    NotActive { id: String, status: String },

    #[error(transparent)]
    Iam(#[from] IamError),

    #[error(transparent)]
    Store(#[from] SecretsManagerError),

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl ResourceError {
    /// Map into the error taxonomy of the step that observed the failure
    pub fn into_rotator_error(self, step: RotationStep) -> RotatorError {
        match self {
            ResourceError::QuotaExceeded(message) => RotatorError::quota_exceeded(message),
            other => RotatorError::step_failed(step, other.to_string()),
        }
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    fn resource_type(&self) -> ResourceType;

    /// Issue a new credential and return the payload to stage as pending
    async fn create_credential(
        &self,
        current: Option<&SecretPayload>,
    ) -> Result<SecretPayload, ResourceError>;

    /// Whether setSecret has work to do for this resource
    fn requires_set(&self) -> bool;

    async fn set_credential(&self, pending: &SecretPayload) -> Result<(), ResourceError>;

    async fn test_credential(&self, pending: &SecretPayload) -> Result<(), ResourceError>;

    /// Revoke the credential in `payload`; a credential already gone is not an error
    async fn revoke_credential(&self, payload: &SecretPayload) -> Result<(), ResourceError>;
}

/// Build the resource a secret's tags describe
pub fn resource_for(
    config: &RotationConfig,
    store: Arc<dyn SecretStore>,
    authority: Arc<dyn CredentialAuthority>,
    probe: Arc<dyn CredentialProbe>,
) -> Box<dyn Resource> {
    let probe = config.test_url.clone().map(|url| ProbeTarget { url, probe });

    match &config.resource {
        ResourceConfig::ServiceSpecificCredential {
            user_name,
            service_name,
            require_set,
            reclaim_stale,
        } => Box::new(ServiceSpecificCredentialResource {
            authority,
            user_name: user_name.clone(),
            service_name: service_name.clone(),
            require_set: *require_set,
            reclaim_stale: *reclaim_stale,
            probe,
        }),
        ResourceConfig::RandomPassword { password_length } => Box::new(RandomPasswordResource {
            store,
            password_length: *password_length,
            probe,
        }),
    }
}

struct ProbeTarget {
    url: String,
    probe: Arc<dyn CredentialProbe>,
}

impl ProbeTarget {
    async fn check(&self, payload: &SecretPayload) -> Result<(), ResourceError> {
        Ok(self.probe.probe(&self.url, payload).await?)
    }
}

// =============================================================================
// SERVICE-SPECIFIC CREDENTIALS
// =============================================================================

/// An IAM service-specific credential, e.g. CodeCommit HTTPS git credentials
pub struct ServiceSpecificCredentialResource {
    authority: Arc<dyn CredentialAuthority>,
    user_name: String,
    service_name: String,
    require_set: bool,
    reclaim_stale: bool,
    probe: Option<ProbeTarget>,
}

impl ServiceSpecificCredentialResource {
    async fn list(&self) -> Result<Vec<CredentialMetadata>, ResourceError> {
        Ok(self
            .authority
            .list_service_specific_credentials(&self.user_name, Some(&self.service_name))
            .await?)
    }

    async fn find(&self, id: &str) -> Result<Option<CredentialMetadata>, ResourceError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|c| c.service_specific_credential_id == id))
    }

    /// Reset a credential the current version does not use
    async fn reclaim(
        &self,
        existing: &[CredentialMetadata],
        current_id: Option<&str>,
    ) -> Result<ServiceSpecificCredential, ResourceError> {
        let stale = existing
            .iter()
            .find(|c| Some(c.service_specific_credential_id.as_str()) != current_id)
            .ok_or_else(|| {
                ResourceError::QuotaExceeded(format!(
                    "every credential of {} for {} is in use",
                    self.user_name, self.service_name
                ))
            })?;

        info!(
            credential_id = %stale.service_specific_credential_id,
            "Resetting stale credential"
        );
        let credential = self
            .authority
            .reset_service_specific_credential(
                &self.user_name,
                &stale.service_specific_credential_id,
            )
            .await?;

        if stale.status != CredentialStatus::Active {
            self.authority
                .update_service_specific_credential(
                    &self.user_name,
                    credential.id(),
                    CredentialStatus::Active,
                )
                .await?;
        }

        Ok(credential)
    }
}

#[async_trait]
impl Resource for ServiceSpecificCredentialResource {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ServiceSpecificCredential
    }

    async fn create_credential(
        &self,
        current: Option<&SecretPayload>,
    ) -> Result<SecretPayload, ResourceError> {
        let existing = self.list().await?;

        let credential = if existing.len() < MAX_SERVICE_SPECIFIC_CREDENTIALS {
            self.authority
                .create_service_specific_credential(&self.user_name, &self.service_name)
                .await
                .map_err(|e| match e {
                    IamError::LimitExceeded(message) => ResourceError::QuotaExceeded(message),
                    other => other.into(),
                })?
        } else if self.reclaim_stale {
            self.reclaim(&existing, current.and_then(SecretPayload::credential_id))
                .await?
        } else {
            return Err(ResourceError::QuotaExceeded(format!(
                "{} already holds {} credentials for {}",
                self.user_name,
                existing.len(),
                self.service_name
            )));
        };

        info!(credential_id = %credential.id(), "Issued credential");

        let mut payload = current.cloned().unwrap_or_default();
        payload.username = Some(credential.metadata.service_user_name.clone());
        payload.password = Some(credential.service_password.clone());
        payload.service_specific_credential_id = Some(credential.id().to_string());
        Ok(payload)
    }

    fn requires_set(&self) -> bool {
        self.require_set
    }

    async fn set_credential(&self, pending: &SecretPayload) -> Result<(), ResourceError> {
        let id = pending
            .credential_id()
            .ok_or(ResourceError::MissingCredentialId)?;
        let credential = self
            .find(id)
            .await?
            .ok_or_else(|| ResourceError::UnknownCredential(id.to_string()))?;

        if credential.status != CredentialStatus::Active {
            info!(credential_id = %id, "Activating credential");
            self.authority
                .update_service_specific_credential(&self.user_name, id, CredentialStatus::Active)
                .await?;
        }
        Ok(())
    }

    async fn test_credential(&self, pending: &SecretPayload) -> Result<(), ResourceError> {
        if let Some(probe) = &self.probe {
            return probe.check(pending).await;
        }

        let id = pending
            .credential_id()
            .ok_or(ResourceError::MissingCredentialId)?;
        match self.find(id).await? {
            Some(c) if c.status == CredentialStatus::Active => Ok(()),
            Some(c) => Err(ResourceError::NotActive {
                id: id.to_string(),
                status: c.status.as_str().to_string(),
            }),
            None => Err(ResourceError::UnknownCredential(id.to_string())),
        }
    }

    async fn revoke_credential(&self, payload: &SecretPayload) -> Result<(), ResourceError> {
        let Some(id) = payload.credential_id() else {
            debug!("Payload names no credential, nothing to revoke");
            return Ok(());
        };

        if self.find(id).await?.is_none() {
            debug!(credential_id = %id, "Credential already revoked");
            return Ok(());
        }

        info!(credential_id = %id, "Deleting credential");
        self.authority
            .delete_service_specific_credential(&self.user_name, id)
            .await?;
        Ok(())
    }
}

// =============================================================================
// RANDOM PASSWORDS
// =============================================================================

/// A password generated by the secret store, for systems that read it from the secret
pub struct RandomPasswordResource {
    store: Arc<dyn SecretStore>,
    password_length: Option<u32>,
    probe: Option<ProbeTarget>,
}

#[async_trait]
impl Resource for RandomPasswordResource {
    fn resource_type(&self) -> ResourceType {
        ResourceType::RandomPassword
    }

    async fn create_credential(
        &self,
        current: Option<&SecretPayload>,
    ) -> Result<SecretPayload, ResourceError> {
        let password = self
            .store
            .get_random_password(self.password_length, PASSWORD_EXCLUDE_CHARACTERS)
            .await?;

        let mut payload = current.cloned().unwrap_or_default();
        payload.password = Some(password);
        Ok(payload)
    }

    fn requires_set(&self) -> bool {
        false
    }

    async fn set_credential(&self, _pending: &SecretPayload) -> Result<(), ResourceError> {
        Ok(())
    }

    async fn test_credential(&self, pending: &SecretPayload) -> Result<(), ResourceError> {
        match &self.probe {
            Some(probe) => probe.check(pending).await,
            None => Ok(()),
        }
    }

    async fn revoke_credential(&self, _payload: &SecretPayload) -> Result<(), ResourceError> {
        Ok(())
    }
}
