use log::info;

use super::codec::CredentialKey;
use crate::config::settings::AuthConfig;
use crate::error::AppError;

/// Minimum accepted length, in bytes, of an HS256 secret.
pub const MIN_SECRET_LEN: usize = 32;

/// The two independent signing keys. Compromise of one must not allow
/// forging credentials of the other kind.
#[derive(Debug, Clone)]
pub struct CredentialKeys {
    pub access: CredentialKey,
    pub renewal: CredentialKey,
}

impl CredentialKeys {
    pub fn from_secrets(access_secret: &str, renewal_secret: &str) -> Result<Self, AppError> {
        if access_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Configuration(format!(
                "ACCESS_CREDENTIAL_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if renewal_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Configuration(format!(
                "RENEWAL_CREDENTIAL_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if access_secret == renewal_secret {
            return Err(AppError::Configuration(
                "Access and renewal credential secrets must differ".to_string(),
            ));
        }

        info!("Credential signing keys initialized");
        Ok(Self {
            access: CredentialKey::from_secret(access_secret.as_bytes()),
            renewal: CredentialKey::from_secret(renewal_secret.as_bytes()),
        })
    }

    pub fn from_settings(auth: &AuthConfig) -> Result<Self, AppError> {
        Self::from_secrets(&auth.access_secret, &auth.renewal_secret)
    }
}
