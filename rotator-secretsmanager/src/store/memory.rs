//! In-memory secret store
//!
//! Implements the staging-label rules the rotation handler relies on: a label
//! lives on at most one version, and moving `AWSCURRENT` retags the old
//! current version `AWSPREVIOUS` under the same lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use rotator_core::VersionStage;
use std::collections::HashMap;
use uuid::Uuid;

use super::traits::{SecretDescription, SecretStore, SecretValue, SecretsManagerError};

const DEFAULT_PASSWORD_LENGTH: u32 = 32;
const MAX_PASSWORD_LENGTH: u32 = 4096;

/// A secret with its versions
#[derive(Debug, Clone)]
pub struct Secret {
    pub arn: String,
    pub name: String,
    pub description: Option<String>,
    /// Secret versions (version_id -> SecretVersion)
    pub versions: HashMap<String, SecretVersion>,
    pub rotation_enabled: bool,
    pub created_date: DateTime<Utc>,
    pub last_changed_date: DateTime<Utc>,
    pub last_accessed_date: Option<DateTime<Utc>>,
    pub tags: HashMap<String, String>,
}

/// A version of a secret
#[derive(Debug, Clone)]
pub struct SecretVersion {
    pub version_id: String,
    /// None while the version is only a staged placeholder
    pub secret_string: Option<String>,
    pub created_date: DateTime<Utc>,
    pub version_stages: Vec<VersionStage>,
}

impl Secret {
    fn holder_of(&self, stage: &VersionStage) -> Option<String> {
        self.versions
            .values()
            .find(|v| v.version_stages.contains(stage))
            .map(|v| v.version_id.clone())
    }

    fn detach(&mut self, stage: &VersionStage) {
        for version in self.versions.values_mut() {
            version.version_stages.retain(|s| s != stage);
        }
    }

    /// Attach `stage` to `version_id`, taking it off whichever version held it
    fn attach(&mut self, version_id: &str, stage: &VersionStage) {
        let previous_holder = self.holder_of(stage);
        if previous_holder.as_deref() == Some(version_id) {
            return;
        }

        self.detach(stage);

        if *stage == VersionStage::Current {
            if let Some(old_current) = previous_holder {
                self.detach(&VersionStage::Previous);
                if let Some(version) = self.versions.get_mut(&old_current) {
                    version.version_stages.push(VersionStage::Previous);
                }
            }
        }

        if let Some(version) = self.versions.get_mut(version_id) {
            if *stage == VersionStage::Current {
                // Rotation of this version is complete
                version
                    .version_stages
                    .retain(|s| *s != VersionStage::Pending && *s != VersionStage::Previous);
            }
            version.version_stages.push(stage.clone());
        }

        self.last_changed_date = Utc::now();
    }

    fn describe(&self) -> SecretDescription {
        SecretDescription {
            arn: self.arn.clone(),
            name: self.name.clone(),
            rotation_enabled: self.rotation_enabled,
            versions: self
                .versions
                .values()
                .filter(|v| !v.version_stages.is_empty())
                .map(|v| (v.version_id.clone(), v.version_stages.clone()))
                .collect(),
            tags: self.tags.clone(),
        }
    }
}

/// In-memory storage for secrets
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    /// Secrets indexed by name
    secrets: DashMap<String, Secret>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self {
            secrets: DashMap::new(),
        }
    }

    /// Create a new secret, staging the initial value (if any) `AWSCURRENT`
    pub fn create_secret(
        &self,
        name: &str,
        description: Option<String>,
        secret_string: Option<String>,
        tags: HashMap<String, String>,
    ) -> Result<Secret, SecretsManagerError> {
        if self.secrets.contains_key(name) {
            return Err(SecretsManagerError::ResourceExists(name.to_string()));
        }

        let now = Utc::now();
        let arn = format!(
            "arn:aws:secretsmanager:us-east-1:000000000000:secret:{}-{}",
            name,
            &Uuid::new_v4().simple().to_string()[..6]
        );

        let mut versions = HashMap::new();
        if secret_string.is_some() {
            let version_id = Uuid::new_v4().to_string();
            versions.insert(
                version_id.clone(),
                SecretVersion {
                    version_id,
                    secret_string,
                    created_date: now,
                    version_stages: vec![VersionStage::Current],
                },
            );
        }

        let secret = Secret {
            arn,
            name: name.to_string(),
            description,
            versions,
            rotation_enabled: false,
            created_date: now,
            last_changed_date: now,
            last_accessed_date: None,
            tags,
        };

        self.secrets.insert(name.to_string(), secret.clone());
        Ok(secret)
    }

    /// Get a snapshot of a secret by name or ARN
    pub fn get_secret(&self, secret_id: &str) -> Result<Secret, SecretsManagerError> {
        let name = self.resolve(secret_id)?;
        self.secrets
            .get(&name)
            .map(|s| s.clone())
            .ok_or_else(|| SecretsManagerError::ResourceNotFound(secret_id.to_string()))
    }

    pub fn set_rotation_enabled(
        &self,
        secret_id: &str,
        enabled: bool,
    ) -> Result<(), SecretsManagerError> {
        self.with_secret(secret_id, |secret| {
            secret.rotation_enabled = enabled;
            Ok(())
        })
    }

    /// Start a rotation the way the service does: enable rotation and stage an
    /// empty version for `client_request_token` as `AWSPENDING`.
    ///
    /// No rotation function is invoked; callers drive the steps themselves.
    pub fn rotate_secret(
        &self,
        secret_id: &str,
        client_request_token: &str,
    ) -> Result<(), SecretsManagerError> {
        self.with_secret(secret_id, |secret| {
            secret.rotation_enabled = true;
            secret
                .versions
                .entry(client_request_token.to_string())
                .or_insert_with(|| SecretVersion {
                    version_id: client_request_token.to_string(),
                    secret_string: None,
                    created_date: Utc::now(),
                    version_stages: Vec::new(),
                });
            secret.attach(client_request_token, &VersionStage::Pending);
            Ok(())
        })
    }

    fn resolve(&self, secret_id: &str) -> Result<String, SecretsManagerError> {
        if self.secrets.contains_key(secret_id) {
            return Ok(secret_id.to_string());
        }

        self.secrets
            .iter()
            .find(|entry| entry.value().arn == secret_id)
            .map(|entry| entry.key().clone())
            .ok_or_else(|| SecretsManagerError::ResourceNotFound(secret_id.to_string()))
    }

    /// Run `f` while holding the secret's entry lock
    fn with_secret<T>(
        &self,
        secret_id: &str,
        f: impl FnOnce(&mut Secret) -> Result<T, SecretsManagerError>,
    ) -> Result<T, SecretsManagerError> {
        let name = self.resolve(secret_id)?;
        let mut secret = self
            .secrets
            .get_mut(&name)
            .ok_or_else(|| SecretsManagerError::ResourceNotFound(secret_id.to_string()))?;
        f(&mut secret)
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn describe_secret(
        &self,
        secret_id: &str,
    ) -> Result<SecretDescription, SecretsManagerError> {
        self.with_secret(secret_id, |secret| Ok(secret.describe()))
    }

    async fn get_secret_value(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
        version_stage: Option<&VersionStage>,
    ) -> Result<SecretValue, SecretsManagerError> {
        self.with_secret(secret_id, |secret| {
            secret.last_accessed_date = Some(Utc::now());

            let version_id = match (version_id, version_stage) {
                (Some(vid), _) => vid.to_string(),
                (None, Some(stage)) => secret.holder_of(stage).ok_or_else(|| {
                    SecretsManagerError::ResourceNotFound(format!(
                        "no version of {} is staged {}",
                        secret.name, stage
                    ))
                })?,
                (None, None) => secret.holder_of(&VersionStage::Current).ok_or_else(|| {
                    SecretsManagerError::ResourceNotFound(format!(
                        "{} has no current version",
                        secret.name
                    ))
                })?,
            };

            let version = secret.versions.get(&version_id).ok_or_else(|| {
                SecretsManagerError::ResourceNotFound(format!("version {} not found", version_id))
            })?;

            if let Some(stage) = version_stage {
                if !version.version_stages.contains(stage) {
                    return Err(SecretsManagerError::ResourceNotFound(format!(
                        "version {} is not staged {}",
                        version_id, stage
                    )));
                }
            }

            if version.secret_string.is_none() {
                return Err(SecretsManagerError::ResourceNotFound(format!(
                    "version {} has no value",
                    version_id
                )));
            }

            Ok(SecretValue {
                arn: secret.arn.clone(),
                name: secret.name.clone(),
                version_id: version.version_id.clone(),
                secret_string: version.secret_string.clone(),
                version_stages: version.version_stages.clone(),
            })
        })
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        version_stages: &[VersionStage],
    ) -> Result<String, SecretsManagerError> {
        if client_request_token.is_empty() {
            return Err(SecretsManagerError::InvalidParameter(
                "ClientRequestToken must not be empty".to_string(),
            ));
        }

        self.with_secret(secret_id, |secret| {
            match secret.versions.get_mut(client_request_token) {
                Some(version) => match version.secret_string.as_deref() {
                    Some(existing) if existing == secret_string => {}
                    Some(_) => {
                        return Err(SecretsManagerError::ResourceExists(format!(
                            "version {} already exists with a different value",
                            client_request_token
                        )))
                    }
                    None => version.secret_string = Some(secret_string.to_string()),
                },
                None => {
                    secret.versions.insert(
                        client_request_token.to_string(),
                        SecretVersion {
                            version_id: client_request_token.to_string(),
                            secret_string: Some(secret_string.to_string()),
                            created_date: Utc::now(),
                            version_stages: Vec::new(),
                        },
                    );
                }
            }

            if version_stages.is_empty() {
                secret.attach(client_request_token, &VersionStage::Current);
            } else {
                for stage in version_stages {
                    secret.attach(client_request_token, stage);
                }
            }

            secret.last_changed_date = Utc::now();
            Ok(client_request_token.to_string())
        })
    }

    async fn update_secret_version_stage(
        &self,
        secret_id: &str,
        version_stage: &VersionStage,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), SecretsManagerError> {
        self.with_secret(secret_id, |secret| {
            for version_id in [move_to_version_id, remove_from_version_id]
                .into_iter()
                .flatten()
            {
                if !secret.versions.contains_key(version_id) {
                    return Err(SecretsManagerError::ResourceNotFound(format!(
                        "version {} not found",
                        version_id
                    )));
                }
            }

            let holder = secret.holder_of(version_stage);
            match (holder.as_deref(), remove_from_version_id) {
                (Some(h), None) if Some(h) != move_to_version_id => {
                    return Err(SecretsManagerError::InvalidParameter(format!(
                        "{} is attached to version {}; RemoveFromVersionId must name it",
                        version_stage, h
                    )))
                }
                (Some(h), Some(from)) if h != from => {
                    return Err(SecretsManagerError::InvalidParameter(format!(
                        "{} is attached to version {}, not {}",
                        version_stage, h, from
                    )))
                }
                (None, Some(from)) => {
                    return Err(SecretsManagerError::InvalidParameter(format!(
                        "{} is not attached to version {}",
                        version_stage, from
                    )))
                }
                _ => {}
            }

            match move_to_version_id {
                Some(to) => secret.attach(to, version_stage),
                None if *version_stage == VersionStage::Current => {
                    return Err(SecretsManagerError::InvalidParameter(
                        "AWSCURRENT can only be moved, not removed".to_string(),
                    ))
                }
                None => {
                    secret.detach(version_stage);
                    secret.last_changed_date = Utc::now();
                }
            }

            Ok(())
        })
    }

    async fn rotate_secret(
        &self,
        secret_id: &str,
        client_request_token: &str,
    ) -> Result<(), SecretsManagerError> {
        MemorySecretStore::rotate_secret(self, secret_id, client_request_token)
    }

    async fn get_random_password(
        &self,
        password_length: Option<u32>,
        exclude_characters: &str,
    ) -> Result<String, SecretsManagerError> {
        let length = password_length.unwrap_or(DEFAULT_PASSWORD_LENGTH);
        if length == 0 || length > MAX_PASSWORD_LENGTH {
            return Err(SecretsManagerError::InvalidParameter(format!(
                "PasswordLength must be between 1 and {}",
                MAX_PASSWORD_LENGTH
            )));
        }

        let alphabet: Vec<char> = ('!'..='~')
            .filter(|c| !exclude_characters.contains(*c))
            .collect();
        if alphabet.is_empty() {
            return Err(SecretsManagerError::InvalidParameter(
                "ExcludeCharacters leaves nothing to choose from".to_string(),
            ));
        }

        let mut rng = rand::thread_rng();
        Ok((0..length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect())
    }
}
