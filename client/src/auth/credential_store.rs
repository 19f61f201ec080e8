use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::keyring_storage::KeyringStorage;
use super::memory_storage::MemoryStorage;
use super::secure_storage_trait::SecureStorage;
use crate::constants::{ACCESS_CREDENTIAL_KEY, RENEWAL_CREDENTIAL_KEY};
use crate::error::SessionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_credential: String,
    pub renewal_credential: String,
}

/// Durable home of the credential pair under two fixed names.
///
/// The pair is written and cleared as a unit; only a renewal replaces the
/// access credential on its own.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SecureStorage>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn SecureStorage>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn keyring(service: &str) -> Self {
        Self::new(Arc::new(KeyringStorage::new(service)))
    }

    /// Loads the pair. A half-present pair is discarded and both names cleared.
    pub async fn load(&self) -> SessionResult<Option<CredentialPair>> {
        let access = self.backend.get_item(ACCESS_CREDENTIAL_KEY).await?;
        let renewal = self.backend.get_item(RENEWAL_CREDENTIAL_KEY).await?;

        match (access, renewal) {
            (Some(access_credential), Some(renewal_credential)) => {
                debug!("Loaded persisted credential pair");
                Ok(Some(CredentialPair {
                    access_credential,
                    renewal_credential,
                }))
            }
            (None, None) => Ok(None),
            _ => {
                warn!("Persisted credential pair is incomplete; clearing both");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Writes both names. On any failure both are removed, so a previously
    /// stored pair can never be restored in place of the one being saved.
    pub async fn save(&self, pair: &CredentialPair) -> SessionResult<()> {
        if let Err(e) = self.write_pair(pair).await {
            warn!("Failed to persist credential pair: {}; clearing stored credentials", e);
            if let Err(rollback) = self.clear().await {
                error!("Failed to clear stored credentials after a failed save: {}", rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn write_pair(&self, pair: &CredentialPair) -> SessionResult<()> {
        self.backend
            .set_item(RENEWAL_CREDENTIAL_KEY, &pair.renewal_credential)
            .await?;
        self.backend
            .set_item(ACCESS_CREDENTIAL_KEY, &pair.access_credential)
            .await
    }

    pub async fn save_access(&self, access_credential: &str) -> SessionResult<()> {
        self.backend
            .set_item(ACCESS_CREDENTIAL_KEY, access_credential)
            .await
    }

    /// Removes both names, attempting the second even if the first fails.
    pub async fn clear(&self) -> SessionResult<()> {
        let access = self.backend.remove_item(ACCESS_CREDENTIAL_KEY).await;
        let renewal = self.backend.remove_item(RENEWAL_CREDENTIAL_KEY).await;
        access.and(renewal)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::SessionError;

    /// Memory backend that refuses writes to one name.
    #[derive(Debug, Default)]
    pub struct RejectingStorage {
        inner: MemoryStorage,
        reject_key: std::sync::Mutex<Option<&'static str>>,
    }

    impl RejectingStorage {
        pub fn reject(&self, key: &'static str) {
            *self.reject_key.lock().unwrap() = Some(key);
        }
    }

    #[async_trait::async_trait]
    impl SecureStorage for RejectingStorage {
        async fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
            if *self.reject_key.lock().unwrap() == Some(key) {
                return Err(SessionError::StorageError(format!("write to {} refused", key)));
            }
            self.inner.set_item(key, value).await
        }

        async fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn remove_item(&self, key: &str) -> SessionResult<()> {
            self.inner.remove_item(key).await
        }
    }
}
