//! Secret store backed by the AWS SDK

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::Client;
use rotator_core::VersionStage;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use super::traits::{SecretDescription, SecretStore, SecretValue, SecretsManagerError};

/// Secrets Manager client with a deadline on every call
#[derive(Debug, Clone)]
pub struct SdkSecretStore {
    client: Client,
    timeout: Duration,
}

impl SdkSecretStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_conf(config: &aws_config::SdkConfig, timeout: Duration) -> Self {
        Self::new(Client::new(config), timeout)
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, SecretsManagerError>
    where
        F: Future<Output = Result<T, SecretsManagerError>>,
    {
        debug!(operation, "Secrets Manager call");
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| SecretsManagerError::Timeout {
                operation,
                after: self.timeout,
            })?
    }
}

fn classify<E>(err: SdkError<E>) -> SecretsManagerError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some("ResourceNotFoundException") => SecretsManagerError::ResourceNotFound(message),
        Some("ResourceExistsException") => SecretsManagerError::ResourceExists(message),
        Some("InvalidParameterException") => SecretsManagerError::InvalidParameter(message),
        Some("InvalidRequestException") => SecretsManagerError::InvalidRequest(message),
        Some("EncryptionFailure") => SecretsManagerError::EncryptionFailure(message),
        _ => SecretsManagerError::Service(message),
    }
}

#[async_trait]
impl SecretStore for SdkSecretStore {
    async fn describe_secret(
        &self,
        secret_id: &str,
    ) -> Result<SecretDescription, SecretsManagerError> {
        self.call("DescribeSecret", async {
            let output = self
                .client
                .describe_secret()
                .secret_id(secret_id)
                .send()
                .await
                .map_err(classify)?;

            let versions = output
                .version_ids_to_stages()
                .map(|map| {
                    map.iter()
                        .map(|(version_id, stages)| {
                            (
                                version_id.clone(),
                                stages.iter().map(|s| VersionStage::from(s.as_str())).collect(),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();

            let tags = output
                .tags()
                .iter()
                .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
                .collect();

            Ok(SecretDescription {
                arn: output.arn().unwrap_or(secret_id).to_string(),
                name: output.name().unwrap_or(secret_id).to_string(),
                rotation_enabled: output.rotation_enabled().unwrap_or(false),
                versions,
                tags,
            })
        })
        .await
    }

    async fn get_secret_value(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
        version_stage: Option<&VersionStage>,
    ) -> Result<SecretValue, SecretsManagerError> {
        self.call("GetSecretValue", async {
            let output = self
                .client
                .get_secret_value()
                .secret_id(secret_id)
                .set_version_id(version_id.map(str::to_string))
                .set_version_stage(version_stage.map(|s| s.as_str().to_string()))
                .send()
                .await
                .map_err(classify)?;

            Ok(SecretValue {
                arn: output.arn().unwrap_or(secret_id).to_string(),
                name: output.name().unwrap_or(secret_id).to_string(),
                version_id: output
                    .version_id()
                    .or(version_id)
                    .unwrap_or_default()
                    .to_string(),
                secret_string: output.secret_string().map(str::to_string),
                version_stages: output
                    .version_stages()
                    .iter()
                    .map(|s| VersionStage::from(s.as_str()))
                    .collect(),
            })
        })
        .await
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        version_stages: &[VersionStage],
    ) -> Result<String, SecretsManagerError> {
        self.call("PutSecretValue", async {
            let stages = (!version_stages.is_empty()).then(|| {
                version_stages
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect::<Vec<_>>()
            });

            let output = self
                .client
                .put_secret_value()
                .secret_id(secret_id)
                .client_request_token(client_request_token)
                .secret_string(secret_string)
                .set_version_stages(stages)
                .send()
                .await
                .map_err(classify)?;

            Ok(output
                .version_id()
                .unwrap_or(client_request_token)
                .to_string())
        })
        .await
    }

    async fn update_secret_version_stage(
        &self,
        secret_id: &str,
        version_stage: &VersionStage,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), SecretsManagerError> {
        self.call("UpdateSecretVersionStage", async {
            self.client
                .update_secret_version_stage()
                .secret_id(secret_id)
                .version_stage(version_stage.as_str())
                .set_move_to_version_id(move_to_version_id.map(str::to_string))
                .set_remove_from_version_id(remove_from_version_id.map(str::to_string))
                .send()
                .await
                .map_err(classify)?;
            Ok(())
        })
        .await
    }

    async fn rotate_secret(
        &self,
        secret_id: &str,
        client_request_token: &str,
    ) -> Result<(), SecretsManagerError> {
        self.call("RotateSecret", async {
            self.client
                .rotate_secret()
                .secret_id(secret_id)
                .client_request_token(client_request_token)
                .rotate_immediately(true)
                .send()
                .await
                .map_err(classify)?;
            Ok(())
        })
        .await
    }

    async fn get_random_password(
        &self,
        password_length: Option<u32>,
        exclude_characters: &str,
    ) -> Result<String, SecretsManagerError> {
        self.call("GetRandomPassword", async {
            let output = self
                .client
                .get_random_password()
                .set_password_length(password_length.map(i64::from))
                .exclude_characters(exclude_characters)
                .send()
                .await
                .map_err(classify)?;

            output
                .random_password()
                .map(str::to_string)
                .ok_or_else(|| {
                    SecretsManagerError::Service("missing password in response".to_string())
                })
        })
        .await
    }
}
