use log::{info, warn};
use thiserror::Error;

use super::codec::CredentialError;
use super::issuer::Issuer;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("renewal credential has expired")]
    Expired,
    #[error("renewal credential is invalid")]
    Invalid,
}

impl RenewalError {
    pub fn reason(&self) -> &'static str {
        match self {
            RenewalError::Expired => "expired",
            RenewalError::Invalid => "invalid",
        }
    }
}

impl From<CredentialError> for RenewalError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::Expired => RenewalError::Expired,
            CredentialError::Malformed | CredentialError::InvalidSignature => RenewalError::Invalid,
        }
    }
}

/// Exchanges a renewal credential for a new access credential.
///
/// The renewal credential itself is not rotated.
#[derive(Debug, Clone)]
pub struct RenewalService {
    issuer: Issuer,
}

impl RenewalService {
    pub fn new(issuer: Issuer) -> Self {
        Self { issuer }
    }

    pub fn renew(&self, renewal_token: &str) -> Result<String, AppError> {
        let claim = self
            .issuer
            .codec()
            .decode(renewal_token, &self.issuer.keys().renewal)
            .map_err(|e| {
                warn!("Renewal rejected: {}", e);
                AppError::Renewal(RenewalError::from(e))
            })?;

        // Subject and role are carried over verbatim; timestamps are re-stamped.
        let access = self.issuer.issue_access(&claim.identity())?;
        info!("Renewed access credential for subject {}", claim.sub);
        Ok(access)
    }
}
