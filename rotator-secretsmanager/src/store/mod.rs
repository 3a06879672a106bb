//! Secret store backends

mod memory;
mod sdk;
mod traits;


pub use memory::{MemorySecretStore, Secret, SecretVersion};
pub use sdk::SdkSecretStore;
pub use traits::{SecretDescription, SecretStore, SecretValue, SecretsManagerError};
