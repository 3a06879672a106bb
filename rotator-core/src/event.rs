//! Rotation invocation payloads

use serde::{Deserialize, Serialize};

use crate::error::RotatorError;

/// One of the four rotation steps, in the order the secret store invokes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationStep {
    #[serde(rename = "createSecret")]
    CreateSecret,
    #[serde(rename = "setSecret")]
    SetSecret,
    #[serde(rename = "testSecret")]
    TestSecret,
    #[serde(rename = "finishSecret")]
    FinishSecret,
}

impl RotationStep {
    pub const ALL: [RotationStep; 4] = [
        Self::CreateSecret,
        Self::SetSecret,
        Self::TestSecret,
        Self::FinishSecret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSecret => "createSecret",
            Self::SetSecret => "setSecret",
            Self::TestSecret => "testSecret",
            Self::FinishSecret => "finishSecret",
        }
    }
}

impl std::fmt::Display for RotationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RotationStep {
    type Err = RotatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createSecret" => Ok(Self::CreateSecret),
            "setSecret" => Ok(Self::SetSecret),
            "testSecret" => Ok(Self::TestSecret),
            "finishSecret" => Ok(Self::FinishSecret),
            other => Err(RotatorError::invalid_step(format!(
                "unknown rotation step '{}'",
                other
            ))),
        }
    }
}

/// The event the secret store sends for every step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationEvent {
    #[serde(rename = "SecretId")]
    pub secret_id: String,
    #[serde(rename = "ClientRequestToken")]
    pub client_request_token: String,
    #[serde(rename = "Step")]
    pub step: RotationStep,
}

// Step is kept as a string here so an unknown step maps to InvalidStep
// instead of a generic deserialisation error.
#[derive(Debug, Deserialize)]
struct RawRotationEvent {
    #[serde(rename = "SecretId")]
    secret_id: String,
    #[serde(rename = "ClientRequestToken")]
    client_request_token: String,
    #[serde(rename = "Step")]
    step: String,
}

impl RotationEvent {
    pub fn new(
        secret_id: impl Into<String>,
        client_request_token: impl Into<String>,
        step: RotationStep,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            client_request_token: client_request_token.into(),
            step,
        }
    }

    /// Parse an invocation payload
    pub fn from_slice(payload: &[u8]) -> Result<Self, RotatorError> {
        let raw: RawRotationEvent = serde_json::from_slice(payload).map_err(|e| {
            RotatorError::invalid_step(format!("malformed rotation event: {}", e))
        })?;

        let step = raw.step.parse::<RotationStep>()?;

        Ok(Self {
            secret_id: raw.secret_id,
            client_request_token: raw.client_request_token,
            step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_event() {
        let payload = br#"
        {
            "SecretId": "arn:aws:secretsmanager:us-east-1:000000000000:secret:rotator-test-AbCdEf",
            "ClientRequestToken": "4e0b3c1a-55d3-4d7e-9b1b-3f0f6c0d2a11",
            "Step": "createSecret"
        }
        "#;

        let event = RotationEvent::from_slice(payload).unwrap();
        assert!(event.secret_id.ends_with("rotator-test-AbCdEf"));
        assert_eq!(
            event.client_request_token,
            "4e0b3c1a-55d3-4d7e-9b1b-3f0f6c0d2a11"
        );
        assert_eq!(event.step, RotationStep::CreateSecret);
    }

    #[test]
    fn test_unknown_step_is_invalid_step() {
        let payload = br#"{"SecretId":"s","ClientRequestToken":"t","Step":"rollbackSecret"}"#;

        let error = RotationEvent::from_slice(payload).unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidStep);
        assert!(error.message.contains("rollbackSecret"));
    }

    #[test]
    fn test_missing_field_is_invalid_step() {
        let error = RotationEvent::from_slice(br#"{"SecretId":"s"}"#).unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidStep);
    }

    #[test]
    fn test_event_serializes_with_wire_names() {
        let event = RotationEvent::new("s", "t", RotationStep::FinishSecret);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"SecretId":"s","ClientRequestToken":"t","Step":"finishSecret"}"#
        );
    }
}
