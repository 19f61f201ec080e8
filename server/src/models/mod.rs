pub mod auth_payloads;
pub mod authenticated_user;
pub mod identity_claim;
pub mod runtime_config;

pub use auth_payloads::{CredentialPair, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
pub use authenticated_user::AuthenticatedUser;
pub use identity_claim::{IdentityClaim, IdentitySummary, Role, VerifiedIdentity};
pub use runtime_config::AppState;
