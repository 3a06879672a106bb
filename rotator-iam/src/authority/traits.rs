//! Credential authority collaborator trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Credentials a user may hold per service before IAM refuses to issue more
pub const MAX_SERVICE_SPECIFIC_CREDENTIALS: usize = 2;

/// IAM errors
#[derive(Debug, Clone, Error)]
pub enum IamError {
    #[error("No such entity: {0}")]
    NoSuchEntity(String),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Service not supported: {0}")]
    ServiceNotSupported(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Response did not include the credential")]
    MissingCredentialInResponse,

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("IAM error: {0}")]
    Service(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    Active,
    Inactive,
    Unknown(String),
}

impl CredentialStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for CredentialStatus {
    fn from(s: &str) -> Self {
        match s {
            "Active" => Self::Active,
            "Inactive" => Self::Inactive,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A service-specific credential as returned by list calls (no password)
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialMetadata {
    pub service_specific_credential_id: String,
    pub service_user_name: String,
    pub service_name: String,
    pub user_name: String,
    pub status: CredentialStatus,
    pub create_date: DateTime<Utc>,
}

/// A freshly issued or reset credential, including its password
#[derive(Clone, PartialEq)]
pub struct ServiceSpecificCredential {
    pub metadata: CredentialMetadata,
    pub service_password: String,
}

impl ServiceSpecificCredential {
    pub fn id(&self) -> &str {
        &self.metadata.service_specific_credential_id
    }
}

impl std::fmt::Debug for ServiceSpecificCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSpecificCredential")
            .field("metadata", &self.metadata)
            .field("service_password", &"******")
            .finish()
    }
}

/// Issues and revokes credentials bound to one principal and one service
#[async_trait]
pub trait CredentialAuthority: Send + Sync {
    async fn create_service_specific_credential(
        &self,
        user_name: &str,
        service_name: &str,
    ) -> Result<ServiceSpecificCredential, IamError>;

    async fn list_service_specific_credentials(
        &self,
        user_name: &str,
        service_name: Option<&str>,
    ) -> Result<Vec<CredentialMetadata>, IamError>;

    async fn delete_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<(), IamError>;

    /// Issue a new password for an existing credential
    async fn reset_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<ServiceSpecificCredential, IamError>;

    async fn update_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
        status: CredentialStatus,
    ) -> Result<(), IamError>;
}
