//! In-memory IAM users and service-specific credentials

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use super::traits::{
    CredentialAuthority, CredentialMetadata, CredentialStatus, IamError,
    ServiceSpecificCredential, MAX_SERVICE_SPECIFIC_CREDENTIALS,
};

const ACCOUNT_ID: &str = "000000000000";
const SUPPORTED_SERVICES: &[&str] = &[
    "codecommit.amazonaws.com",
    "cassandra.amazonaws.com",
    "bedrock.amazonaws.com",
];

/// An IAM user
#[derive(Debug, Clone)]
pub struct User {
    pub user_name: String,
    pub user_id: String,
    pub arn: String,
    pub create_date: DateTime<Utc>,
    pub credentials: Vec<StoredCredential>,
}

/// A credential as held by the authority
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub metadata: CredentialMetadata,
    pub service_password: String,
}

impl StoredCredential {
    fn issued(&self) -> ServiceSpecificCredential {
        ServiceSpecificCredential {
            metadata: self.metadata.clone(),
            service_password: self.service_password.clone(),
        }
    }
}

/// In-memory IAM storage
#[derive(Debug, Default)]
pub struct MemoryCredentialAuthority {
    /// Users indexed by name
    users: DashMap<String, User>,
}

impl MemoryCredentialAuthority {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Create a user
    pub fn create_user(&self, user_name: &str) -> Result<User, IamError> {
        if self.users.contains_key(user_name) {
            return Err(IamError::InvalidInput(format!(
                "user {} already exists",
                user_name
            )));
        }

        let user = User {
            user_name: user_name.to_string(),
            user_id: generate_id("AIDA"),
            arn: format!("arn:aws:iam::{}:user/{}", ACCOUNT_ID, user_name),
            create_date: Utc::now(),
            credentials: Vec::new(),
        };

        self.users.insert(user_name.to_string(), user.clone());
        Ok(user)
    }

    /// Get a user
    pub fn get_user(&self, user_name: &str) -> Result<User, IamError> {
        self.users
            .get(user_name)
            .map(|u| u.clone())
            .ok_or_else(|| IamError::NoSuchEntity(user_name.to_string()))
    }

    fn with_user<T>(
        &self,
        user_name: &str,
        f: impl FnOnce(&mut User) -> Result<T, IamError>,
    ) -> Result<T, IamError> {
        let mut user = self
            .users
            .get_mut(user_name)
            .ok_or_else(|| IamError::NoSuchEntity(user_name.to_string()))?;
        f(&mut user)
    }
}

fn generate_id(prefix: &str) -> String {
    format!(
        "{}{}",
        prefix,
        &Uuid::new_v4().simple().to_string()[..17].to_uppercase()
    )
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(44)
        .map(char::from)
        .collect()
}

fn find_credential<'a>(
    user: &'a mut User,
    credential_id: &str,
) -> Result<&'a mut StoredCredential, IamError> {
    let user_name = user.user_name.clone();
    user.credentials
        .iter_mut()
        .find(|c| c.metadata.service_specific_credential_id == credential_id)
        .ok_or_else(|| {
            IamError::NoSuchEntity(format!(
                "credential {} for user {}",
                credential_id, user_name
            ))
        })
}

#[async_trait]
impl CredentialAuthority for MemoryCredentialAuthority {
    async fn create_service_specific_credential(
        &self,
        user_name: &str,
        service_name: &str,
    ) -> Result<ServiceSpecificCredential, IamError> {
        if !SUPPORTED_SERVICES.contains(&service_name) {
            return Err(IamError::ServiceNotSupported(service_name.to_string()));
        }

        self.with_user(user_name, |user| {
            let held = user
                .credentials
                .iter()
                .filter(|c| c.metadata.service_name == service_name)
                .count();
            if held >= MAX_SERVICE_SPECIFIC_CREDENTIALS {
                return Err(IamError::LimitExceeded(format!(
                    "user {} already has {} credentials for {}",
                    user_name, held, service_name
                )));
            }

            let credential = StoredCredential {
                metadata: CredentialMetadata {
                    service_specific_credential_id: generate_id("ACCA"),
                    service_user_name: format!("{}-at-{}", user_name, ACCOUNT_ID),
                    service_name: service_name.to_string(),
                    user_name: user_name.to_string(),
                    status: CredentialStatus::Active,
                    create_date: Utc::now(),
                },
                service_password: generate_password(),
            };

            user.credentials.push(credential.clone());
            Ok(credential.issued())
        })
    }

    async fn list_service_specific_credentials(
        &self,
        user_name: &str,
        service_name: Option<&str>,
    ) -> Result<Vec<CredentialMetadata>, IamError> {
        if let Some(service) = service_name {
            if !SUPPORTED_SERVICES.contains(&service) {
                return Err(IamError::ServiceNotSupported(service.to_string()));
            }
        }

        self.with_user(user_name, |user| {
            Ok(user
                .credentials
                .iter()
                .filter(|c| service_name.map_or(true, |s| c.metadata.service_name == s))
                .map(|c| c.metadata.clone())
                .collect())
        })
    }

    async fn delete_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<(), IamError> {
        self.with_user(user_name, |user| {
            find_credential(user, credential_id)?;
            user.credentials
                .retain(|c| c.metadata.service_specific_credential_id != credential_id);
            Ok(())
        })
    }

    async fn reset_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
    ) -> Result<ServiceSpecificCredential, IamError> {
        self.with_user(user_name, |user| {
            let credential = find_credential(user, credential_id)?;
            credential.service_password = generate_password();
            Ok(credential.issued())
        })
    }

    async fn update_service_specific_credential(
        &self,
        user_name: &str,
        credential_id: &str,
        status: CredentialStatus,
    ) -> Result<(), IamError> {
        if let CredentialStatus::Unknown(s) = &status {
            return Err(IamError::InvalidInput(format!("invalid status {}", s)));
        }

        self.with_user(user_name, |user| {
            find_credential(user, credential_id)?.metadata.status = status;
            Ok(())
        })
    }
}
