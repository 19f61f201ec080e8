use async_trait::async_trait;
use keyring::{Entry, Error as KeyringError};
use log::{debug, error};

use super::secure_storage_trait::SecureStorage;
use crate::error::{SessionError, SessionResult};

/// Persists items in the OS keyring, one entry per key under a shared service name.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> SessionResult<Entry> {
        Entry::new(&self.service, key).map_err(|e| {
            error!("Failed to create keyring entry - OS: {:?}, Error: {}", std::env::consts::OS, e);
            SessionError::StorageError(format!("Failed to create keyring entry: {}", e))
        })
    }
}

#[async_trait]
impl SecureStorage for KeyringStorage {
    async fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
        self.entry(key)?.set_password(value).map_err(|e| {
            error!("Failed to store {} in keyring: {}", key, e);
            SessionError::StorageError(format!("Failed to store {}: {}", key, e))
        })?;
        debug!("{} saved to keyring", key);
        Ok(())
    }

    async fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(KeyringError::NoEntry) => {
                debug!("No {} entry found in keyring", key);
                Ok(None)
            }
            Err(e) => {
                error!("Keyring error reading {} - OS: {:?}, Details: {}", key, std::env::consts::OS, e);
                Err(SessionError::StorageError(format!("Failed to retrieve {} from keyring: {}", key, e)))
            }
        }
    }

    async fn remove_item(&self, key: &str) -> SessionResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => {
                debug!("{} cleared from keyring", key);
                Ok(())
            }
            Err(KeyringError::NoEntry) => Ok(()),
            Err(e) => {
                error!("Failed to clear {} from keyring: {}", key, e);
                Err(SessionError::StorageError(format!("Failed to clear {}: {}", key, e)))
            }
        }
    }
}
