//! Credential authority collaborator for the credential rotator
//!
//! Issues, lists, resets and deletes IAM service-specific credentials.
//! `MemoryCredentialAuthority` enforces the per-user, per-service quota the
//! way IAM does; `SdkCredentialAuthority` talks to IAM itself.

pub mod authority;

pub use authority::{
    CredentialAuthority, CredentialMetadata, CredentialStatus, IamError,
    MemoryCredentialAuthority, SdkCredentialAuthority, ServiceSpecificCredential,
    MAX_SERVICE_SPECIFIC_CREDENTIALS,
};
