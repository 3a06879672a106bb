//! Core types for the credential rotator
//!
//! Shared by the collaborator crates and the rotation handler.

pub mod error;
pub mod event;
pub mod payload;
pub mod stage;

pub use error::{ErrorKind, RotatorError, RotatorResult};
pub use event::{RotationEvent, RotationStep};
pub use payload::SecretPayload;
pub use stage::{VersionStage, REVOKE_MARKER_STAGE, SET_MARKER_STAGE};
