//! Secret store collaborator for the credential rotator
//!
//! Provides the `SecretStore` seam with two backends:
//! - `SdkSecretStore`: AWS Secrets Manager, every call bounded by a timeout
//! - `MemorySecretStore`: in-memory, with the service's staging-label rules
//!   (AWSCURRENT, AWSPENDING, AWSPREVIOUS, custom labels)

pub mod store;

pub use store::{
    MemorySecretStore, SdkSecretStore, SecretDescription, SecretStore, SecretValue,
    SecretsManagerError,
};
