pub mod credential_store;
pub mod keyring_storage;
pub mod memory_storage;
pub mod secure_storage_trait;
pub mod session_agent;
pub mod token_introspection;

pub use credential_store::{CredentialPair, CredentialStore};
pub use keyring_storage::KeyringStorage;
pub use memory_storage::MemoryStorage;
pub use secure_storage_trait::SecureStorage;
pub use session_agent::SessionAgent;
