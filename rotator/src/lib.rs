//! Secret rotation handler for credentials issued by an external authority
//!
//! The secret store invokes the handler once per rotation step. Each
//! invocation is checked against the secret's version stages and dispatched
//! to the matching step of the [`Rotator`].

pub mod config;
pub mod handler;
pub mod probe;
pub mod resource;
pub mod rotation;
pub mod secret_config;

pub use config::Config;
pub use handler::RotationHandler;
pub use probe::{CredentialProbe, HttpBasicProbe, ProbeError};
pub use resource::{Resource, ResourceError};
pub use rotation::Rotator;
pub use secret_config::{ResourceConfig, ResourceType, RotationConfig, SecretConfigError};
