use async_trait::async_trait;
use dashmap::DashMap;

use super::secure_storage_trait::SecureStorage;
use crate::error::SessionResult;

/// Process-local storage; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStorage for MemoryStorage {
    async fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    async fn remove_item(&self, key: &str) -> SessionResult<()> {
        self.items.remove(key);
        Ok(())
    }
}
