use crate::error::SessionResult;
use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait SecureStorage: Send + Sync + Debug {
    async fn set_item(&self, key: &str, value: &str) -> SessionResult<()>;
    async fn get_item(&self, key: &str) -> SessionResult<Option<String>>;
    async fn remove_item(&self, key: &str) -> SessionResult<()>;
}
