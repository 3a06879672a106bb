//! Secret store collaborator trait

use async_trait::async_trait;
use rotator_core::VersionStage;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors from secret store operations
#[derive(Debug, Clone, Error)]
pub enum SecretsManagerError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceExists(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Encryption failure: {0}")]
    EncryptionFailure(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Secrets Manager error: {0}")]
    Service(String),
}

impl SecretsManagerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_))
    }
}

/// Metadata returned by `describe_secret`
#[derive(Debug, Clone, Default)]
pub struct SecretDescription {
    pub arn: String,
    pub name: String,
    pub rotation_enabled: bool,
    /// Versions that hold at least one stage, keyed by version id
    pub versions: HashMap<String, Vec<VersionStage>>,
    pub tags: HashMap<String, String>,
}

impl SecretDescription {
    pub fn stages_of(&self, version_id: &str) -> Option<&[VersionStage]> {
        self.versions.get(version_id).map(|s| s.as_slice())
    }

    pub fn version_has_stage(&self, version_id: &str, stage: &VersionStage) -> bool {
        self.stages_of(version_id)
            .map(|stages| stages.contains(stage))
            .unwrap_or(false)
    }

    /// The version currently holding `stage`, if any
    pub fn version_with_stage(&self, stage: &VersionStage) -> Option<&str> {
        self.versions
            .iter()
            .find(|(_, stages)| stages.contains(stage))
            .map(|(version_id, _)| version_id.as_str())
    }
}

/// A secret version's value
#[derive(Clone)]
pub struct SecretValue {
    pub arn: String,
    pub name: String,
    pub version_id: String,
    pub secret_string: Option<String>,
    pub version_stages: Vec<VersionStage>,
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("arn", &self.arn)
            .field("version_id", &self.version_id)
            .field("secret_string", &self.secret_string.as_ref().map(|_| "******"))
            .field("version_stages", &self.version_stages)
            .finish()
    }
}

/// Abstract secret store used by the rotation handler
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Describe a secret by name or ARN
    async fn describe_secret(&self, secret_id: &str)
        -> Result<SecretDescription, SecretsManagerError>;

    /// Get a version's value by id, by stage, or both (AWSCURRENT if neither)
    async fn get_secret_value(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
        version_stage: Option<&VersionStage>,
    ) -> Result<SecretValue, SecretsManagerError>;

    /// Store a value under `client_request_token` with the given stages.
    ///
    /// Idempotent for an identical value; returns the version id.
    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        version_stages: &[VersionStage],
    ) -> Result<String, SecretsManagerError>;

    /// Atomically move `version_stage` from `remove_from_version_id` to
    /// `move_to_version_id`
    async fn update_secret_version_stage(
        &self,
        secret_id: &str,
        version_stage: &VersionStage,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), SecretsManagerError>;

    /// Start a rotation under `client_request_token`.
    ///
    /// The token's version is staged `AWSPENDING` without a value. The
    /// service then invokes the secret's rotation function for each step.
    async fn rotate_secret(
        &self,
        secret_id: &str,
        client_request_token: &str,
    ) -> Result<(), SecretsManagerError>;

    /// Generate a random password
    async fn get_random_password(
        &self,
        password_length: Option<u32>,
        exclude_characters: &str,
    ) -> Result<String, SecretsManagerError>;
}
