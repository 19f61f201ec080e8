pub mod clock;
pub mod codec;
pub mod issuer;
pub mod keys;
pub mod renewal;
pub mod verifier;

use chrono::Duration;
use std::sync::Arc;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{CredentialCodec, CredentialError, CredentialKey};
pub use issuer::{CredentialLifetimes, Issuer};
pub use keys::CredentialKeys;
pub use renewal::{RenewalError, RenewalService};
pub use verifier::Verifier;

use crate::config::AppSettings;
use crate::error::AppError;

/// Issuer, verifier and renewal service sharing one codec and key set.
#[derive(Debug, Clone)]
pub struct AuthServices {
    pub issuer: Issuer,
    pub verifier: Verifier,
    pub renewal: RenewalService,
}

impl AuthServices {
    pub fn new(codec: CredentialCodec, keys: CredentialKeys, lifetimes: CredentialLifetimes) -> Self {
        let keys = Arc::new(keys);
        let issuer = Issuer::new(codec.clone(), Arc::clone(&keys), lifetimes);
        Self {
            verifier: Verifier::new(codec, keys),
            renewal: RenewalService::new(issuer.clone()),
            issuer,
        }
    }

    pub fn from_settings(settings: &AppSettings, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let keys = CredentialKeys::from_settings(&settings.auth)?;
        let lifetimes = CredentialLifetimes {
            access: Duration::minutes(settings.auth.access_ttl_minutes),
            renewal: Duration::days(settings.auth.renewal_ttl_days),
        };
        let codec = CredentialCodec::new(settings.app.name.clone(), clock);
        Ok(Self::new(codec, keys, lifetimes))
    }
}
