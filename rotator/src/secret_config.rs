//! Per-secret rotation settings, read from the secret's tags

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TAG_RESOURCE_TYPE: &str = "rotator:resourceType";
pub const TAG_USER_NAME: &str = "rotator:userName";
pub const TAG_SERVICE_NAME: &str = "rotator:serviceName";
pub const TAG_REQUIRE_SET: &str = "rotator:requireSet";
pub const TAG_RECLAIM_STALE: &str = "rotator:reclaimStale";
pub const TAG_TEST_URL: &str = "rotator:testUrl";
pub const TAG_PASSWORD_LENGTH: &str = "rotator:passwordLength";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretConfigError {
    #[error("missing tag {0}")]
    MissingTag(&'static str),

    #[error("invalid value '{value}' for tag {tag}")]
    InvalidTag { tag: &'static str, value: String },
}

/// Kind of credential a secret holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    ServiceSpecificCredential,
    RandomPassword,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::ServiceSpecificCredential => "ServiceSpecificCredential",
            ResourceType::RandomPassword => "RandomPassword",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = SecretConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ServiceSpecificCredential" => Ok(ResourceType::ServiceSpecificCredential),
            "RandomPassword" => Ok(ResourceType::RandomPassword),
            other => Err(SecretConfigError::InvalidTag {
                tag: TAG_RESOURCE_TYPE,
                value: other.to_string(),
            }),
        }
    }
}

/// Settings for the resource behind a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceConfig {
    ServiceSpecificCredential {
        user_name: String,
        service_name: String,
        require_set: bool,
        reclaim_stale: bool,
    },
    RandomPassword {
        password_length: Option<u32>,
    },
}

impl ResourceConfig {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceConfig::ServiceSpecificCredential { .. } => {
                ResourceType::ServiceSpecificCredential
            }
            ResourceConfig::RandomPassword { .. } => ResourceType::RandomPassword,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    pub resource: ResourceConfig,
    /// Endpoint to probe with the new credential during testSecret
    pub test_url: Option<String>,
}

impl RotationConfig {
    pub fn from_tags(tags: &HashMap<String, String>) -> Result<Self, SecretConfigError> {
        let resource_type: ResourceType = required(tags, TAG_RESOURCE_TYPE)?.parse()?;

        let resource = match resource_type {
            ResourceType::ServiceSpecificCredential => ResourceConfig::ServiceSpecificCredential {
                user_name: required(tags, TAG_USER_NAME)?.to_string(),
                service_name: required(tags, TAG_SERVICE_NAME)?.to_string(),
                require_set: parsed(tags, TAG_REQUIRE_SET)?.unwrap_or(true),
                reclaim_stale: parsed(tags, TAG_RECLAIM_STALE)?.unwrap_or(false),
            },
            ResourceType::RandomPassword => ResourceConfig::RandomPassword {
                password_length: parsed(tags, TAG_PASSWORD_LENGTH)?,
            },
        };

        Ok(Self {
            resource,
            test_url: tags.get(TAG_TEST_URL).cloned(),
        })
    }
}

fn required<'a>(
    tags: &'a HashMap<String, String>,
    tag: &'static str,
) -> Result<&'a str, SecretConfigError> {
    tags.get(tag)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(SecretConfigError::MissingTag(tag))
}

fn parsed<T: FromStr>(
    tags: &HashMap<String, String>,
    tag: &'static str,
) -> Result<Option<T>, SecretConfigError> {
    tags.get(tag)
        .map(|value| {
            value.parse().map_err(|_| SecretConfigError::InvalidTag {
                tag,
                value: value.clone(),
            })
        })
        .transpose()
}
