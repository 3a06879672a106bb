//! Rotation error taxonomy

use thiserror::Error;

use crate::event::RotationStep;

/// Failure categories reported back to the secret store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CreateFailed,
    SetFailed,
    TestFailed,
    FinishFailed,
    InvalidStep,
    QuotaExceeded,
    PreconditionFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateFailed => "CreateFailed",
            Self::SetFailed => "SetFailed",
            Self::TestFailed => "TestFailed",
            Self::FinishFailed => "FinishFailed",
            Self::InvalidStep => "InvalidStep",
            Self::QuotaExceeded => "QuotaExceeded",
            Self::PreconditionFailed => "PreconditionFailed",
        }
    }

    /// The failure kind a step reports when one of its collaborator calls fails
    pub fn for_step(step: RotationStep) -> Self {
        match step {
            RotationStep::CreateSecret => Self::CreateFailed,
            RotationStep::SetSecret => Self::SetFailed,
            RotationStep::TestSecret => Self::TestFailed,
            RotationStep::FinishSecret => Self::FinishFailed,
        }
    }

    /// Whether re-invoking the same step can succeed without operator action.
    ///
    /// A full credential quota needs a stale credential deleted first, and an
    /// invalid event or precondition will not change on its own.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::QuotaExceeded | Self::InvalidStep | Self::PreconditionFailed
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected rotation step
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct RotatorError {
    pub kind: ErrorKind,
    pub message: String,
    pub secret_id: Option<String>,
}

pub type RotatorResult<T> = Result<T, RotatorError>;

impl RotatorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            secret_id: None,
        }
    }

    pub fn with_secret(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    pub fn create_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CreateFailed, message)
    }

    pub fn set_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SetFailed, message)
    }

    pub fn test_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TestFailed, message)
    }

    pub fn finish_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FinishFailed, message)
    }

    pub fn invalid_step(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidStep, message)
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PreconditionFailed, message)
    }

    /// Failure of a collaborator call made while running `step`
    pub fn step_failed(step: RotationStep, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::for_step(step), message)
    }

    pub fn error_type(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Message reported to the caller, naming the secret when known
    pub fn error_message(&self) -> String {
        match &self.secret_id {
            Some(secret_id) => format!("{} (secret {})", self.message, secret_id),
            None => self.message.clone(),
        }
    }
}
