//! The rotation state machine
//!
//! The secret store invokes the handler once per step, in order:
//! `createSecret`, `setSecret`, `testSecret`, `finishSecret`. The handler
//! keeps no state of its own; everything it needs to resume lives in the
//! version stages of the secret, so every step may be retried from the top.

mod create;
mod finish;
mod set;
mod test;

use rotator_core::{
    RotationEvent, RotationStep, RotatorError, RotatorResult, SecretPayload, VersionStage,
};
use rotator_iam::CredentialAuthority;
use rotator_secretsmanager::{SecretDescription, SecretStore};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::probe::CredentialProbe;
use crate::resource::{resource_for, Resource};
use crate::secret_config::RotationConfig;

/// Where the event's token stands among the secret's versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenState {
    /// The token's version is staged AWSPENDING
    Pending,
    /// The token's version is already AWSCURRENT
    Current,
}

/// Everything a step needs, resolved once per invocation
pub(crate) struct StepContext<'a> {
    pub store: &'a dyn SecretStore,
    pub secret_id: &'a str,
    pub token: &'a str,
    pub description: SecretDescription,
    pub resource: Box<dyn Resource>,
    pub token_state: TokenState,
}

impl StepContext<'_> {
    /// Read the value staged AWSPENDING under this token
    pub async fn pending_payload(&self, step: RotationStep) -> RotatorResult<SecretPayload> {
        let value = self
            .store
            .get_secret_value(self.secret_id, Some(self.token), Some(&VersionStage::Pending))
            .await
            .map_err(|e| {
                RotatorError::step_failed(step, format!("cannot read pending version: {}", e))
            })?;

        parse_payload(value.secret_string.as_deref(), step)?.ok_or_else(|| {
            RotatorError::step_failed(step, "pending version holds no secret string")
        })
    }
}

pub(crate) fn parse_payload(
    secret_string: Option<&str>,
    step: RotationStep,
) -> RotatorResult<Option<SecretPayload>> {
    secret_string
        .map(SecretPayload::from_secret_string)
        .transpose()
        .map_err(|e| RotatorError::step_failed(step, format!("invalid secret payload: {}", e)))
}

/// Rotation handler over a secret store and a credential authority
#[derive(Clone)]
pub struct Rotator {
    store: Arc<dyn SecretStore>,
    authority: Arc<dyn CredentialAuthority>,
    probe: Arc<dyn CredentialProbe>,
}

impl Rotator {
    pub fn new(
        store: Arc<dyn SecretStore>,
        authority: Arc<dyn CredentialAuthority>,
        probe: Arc<dyn CredentialProbe>,
    ) -> Self {
        Self {
            store,
            authority,
            probe,
        }
    }

    /// Run one rotation step
    pub async fn handle(&self, event: &RotationEvent) -> RotatorResult<()> {
        let span = info_span!(
            "rotation",
            secret_id = %event.secret_id,
            token = %event.client_request_token,
            step = %event.step,
        );

        async {
            let ctx = self
                .prepare(&event.secret_id, &event.client_request_token, event.step)
                .await?;

            debug!(
                resource = %ctx.resource.resource_type(),
                token_state = ?ctx.token_state,
                "Preconditions hold"
            );

            let result = match event.step {
                RotationStep::CreateSecret => create::create_secret(&ctx).await,
                RotationStep::SetSecret => set::set_secret(&ctx).await,
                RotationStep::TestSecret => test::test_secret(&ctx).await,
                RotationStep::FinishSecret => finish::finish_secret(&ctx).await,
            };

            match &result {
                Ok(()) => info!("Step complete"),
                Err(e) => warn!(
                    error_type = e.error_type(),
                    retryable = e.is_retryable(),
                    error = %e.message,
                    "Step failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
        .map_err(|e| e.with_secret(event.secret_id.clone()))
    }

    /// Ask the store to stage `token` as `AWSPENDING` and start a rotation
    pub async fn start_rotation(&self, secret_id: &str, token: &str) -> RotatorResult<()> {
        self.store
            .rotate_secret(secret_id, token)
            .await
            .map_err(|e| {
                RotatorError::create_failed(format!("cannot start rotation: {}", e))
                    .with_secret(secret_id.to_string())
            })?;
        info!(secret_id = %secret_id, token = %token, "Rotation started");
        Ok(())
    }

    /// Run all four steps for a token already staged `AWSPENDING`
    pub async fn rotate(&self, secret_id: &str, token: &str) -> RotatorResult<()> {
        for step in RotationStep::ALL {
            self.handle(&RotationEvent::new(secret_id, token, step))
                .await?;
        }
        Ok(())
    }

    async fn prepare<'a>(
        &'a self,
        secret_id: &'a str,
        token: &'a str,
        step: RotationStep,
    ) -> RotatorResult<StepContext<'a>> {
        let description = self.store.describe_secret(secret_id).await.map_err(|e| {
            RotatorError::precondition_failed(format!("cannot describe secret: {}", e))
        })?;

        let config = RotationConfig::from_tags(&description.tags).map_err(|e| {
            RotatorError::precondition_failed(format!("invalid rotation tags: {}", e))
        })?;

        if !description.rotation_enabled {
            return Err(RotatorError::precondition_failed(
                "rotation is not enabled for the secret",
            ));
        }

        let token_state = token_state(&description, token, step)?;

        let resource = resource_for(
            &config,
            self.store.clone(),
            self.authority.clone(),
            self.probe.clone(),
        );

        Ok(StepContext {
            store: self.store.as_ref(),
            secret_id,
            token,
            description,
            resource,
            token_state,
        })
    }
}

fn token_state(
    description: &SecretDescription,
    token: &str,
    step: RotationStep,
) -> RotatorResult<TokenState> {
    match description.stages_of(token) {
        Some(stages) if stages.contains(&VersionStage::Current) => {
            if step == RotationStep::FinishSecret {
                Ok(TokenState::Current)
            } else {
                Err(RotatorError::precondition_failed(format!(
                    "version {} is already AWSCURRENT",
                    token
                )))
            }
        }
        Some(stages) if stages.contains(&VersionStage::Pending) => Ok(TokenState::Pending),
        Some(_) => Err(RotatorError::precondition_failed(format!(
            "version {} is not staged AWSPENDING",
            token
        ))),
        None => Err(RotatorError::precondition_failed(format!(
            "no version exists for token {}",
            token
        ))),
    }
}
