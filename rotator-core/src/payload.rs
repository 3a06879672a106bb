//! The JSON document stored as a secret version's `SecretString`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_specific_credential_id: Option<String>,

    /// Fields written by other tools, carried over unchanged
    #[serde(flatten)]
    pub attributes: HashMap<String, Value>,
}

impl SecretPayload {
    pub fn from_secret_string(secret_string: &str) -> serde_json::Result<Self> {
        serde_json::from_str(secret_string)
    }

    pub fn to_secret_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn credential_id(&self) -> Option<&str> {
        self.service_specific_credential_id.as_deref()
    }
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPayload")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "******"))
            .field(
                "service_specific_credential_id",
                &self.service_specific_credential_id,
            )
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}
