use crate::api::HttpTransport;
use crate::auth::{CredentialStore, SessionAgent};
use crate::constants::DEFAULT_KEYRING_SERVICE;
use crate::error::{SessionError, SessionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// OS keyring under the given service name
    Keyring { service: String },
    Memory,
}

impl Default for StorageMode {
    fn default() -> Self {
        StorageMode::Keyring {
            service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub storage: StorageMode,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            storage: StorageMode::default(),
        }
    }

    pub fn with_storage(mut self, storage: StorageMode) -> Self {
        self.storage = storage;
        self
    }

    fn validate(&self) -> SessionResult<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(SessionError::ConfigError("base_url must not be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SessionError::ConfigError(format!(
                "base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        Ok(())
    }

    fn credential_store(&self) -> CredentialStore {
        match &self.storage {
            StorageMode::Keyring { service } => CredentialStore::keyring(service),
            StorageMode::Memory => CredentialStore::in_memory(),
        }
    }

    /// Builds an agent talking HTTP to `base_url`. Call `restore` on it to
    /// pick up a persisted session.
    pub fn build_agent(&self) -> SessionResult<SessionAgent<HttpTransport>> {
        self.validate()?;
        let transport = HttpTransport::new(self.base_url.trim());
        Ok(SessionAgent::new(transport, self.credential_store()))
    }
}
