use async_trait::async_trait;

use super::types::{ApiRequest, ApiResponse, LoginResponse};
use crate::error::SessionResult;

/// The collaborator's wire: how requests, logins and renewals reach the server.
///
/// `send` returns authorization failures as ordinary responses so the
/// session agent can inspect them; transport failures are errors.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &ApiRequest, access_credential: Option<&str>) -> SessionResult<ApiResponse>;

    async fn login(&self, email: &str, password: &str) -> SessionResult<LoginResponse>;

    /// Exchanges a renewal credential for a new access credential.
    async fn renew(&self, renewal_credential: &str) -> SessionResult<String>;
}
