//! Secret version staging labels

use serde::{Deserialize, Serialize};

/// Label attached to a secret version.
///
/// A label is held by at most one version of a secret at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionStage {
    Current,
    Pending,
    Previous,
    Custom(String),
}

/// Marks the pending version whose credential has been pushed by setSecret
pub const SET_MARKER_STAGE: &str = "ROTATORSET";

/// Marks the version finishSecret superseded and still has to revoke
pub const REVOKE_MARKER_STAGE: &str = "ROTATORREVOKE";

impl VersionStage {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Current => "AWSCURRENT",
            Self::Pending => "AWSPENDING",
            Self::Previous => "AWSPREVIOUS",
            Self::Custom(label) => label,
        }
    }

    pub fn set_marker() -> Self {
        Self::Custom(SET_MARKER_STAGE.to_string())
    }

    pub fn revoke_marker() -> Self {
        Self::Custom(REVOKE_MARKER_STAGE.to_string())
    }
}

impl From<&str> for VersionStage {
    fn from(s: &str) -> Self {
        match s {
            "AWSCURRENT" => Self::Current,
            "AWSPENDING" => Self::Pending,
            "AWSPREVIOUS" => Self::Previous,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for VersionStage {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<VersionStage> for String {
    fn from(stage: VersionStage) -> Self {
        stage.as_str().to_string()
    }
}

impl std::fmt::Display for VersionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
