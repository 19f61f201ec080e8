pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;

pub use api::{ApiRequest, ApiResponse, HttpTransport, IdentitySummary, Role, Transport};
pub use auth::{CredentialPair, CredentialStore, SessionAgent};
pub use config::{ClientConfig, StorageMode};
pub use error::{ErrorBody, SessionError, SessionResult};
