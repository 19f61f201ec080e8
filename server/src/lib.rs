//! Campus Auth Server Library
//!
//! Session credential lifecycle: issuing access/renewal credential pairs,
//! verifying access credentials, renewing them, and the authorization gate
//! guarding the `/api` scope. Exported for both the server binary and tests.

pub mod auth_stores;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types for convenience
pub use config::AppSettings;
pub use error::AppError;
pub use models::runtime_config::AppState;
