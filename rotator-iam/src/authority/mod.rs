//! Credential authority backends

mod memory;
mod sdk;
mod traits;


pub use memory::{MemoryCredentialAuthority, StoredCredential, User};
pub use sdk::SdkCredentialAuthority;
pub use traits::{
    CredentialAuthority, CredentialMetadata, CredentialStatus, IamError,
    ServiceSpecificCredential, MAX_SERVICE_SPECIFIC_CREDENTIALS,
};
