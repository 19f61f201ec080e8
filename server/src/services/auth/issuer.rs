use chrono::Duration;
use log::info;
use std::sync::Arc;

use super::codec::CredentialCodec;
use super::keys::CredentialKeys;
use crate::error::AppError;
use crate::models::{CredentialPair, VerifiedIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialLifetimes {
    pub access: Duration,
    pub renewal: Duration,
}

/// Mints credential pairs for identities verified upstream.
#[derive(Debug, Clone)]
pub struct Issuer {
    codec: CredentialCodec,
    keys: Arc<CredentialKeys>,
    lifetimes: CredentialLifetimes,
}

impl Issuer {
    pub fn new(codec: CredentialCodec, keys: Arc<CredentialKeys>, lifetimes: CredentialLifetimes) -> Self {
        Self { codec, keys, lifetimes }
    }

    /// Always a fresh pair: both credentials are stamped at the current instant.
    pub fn issue(&self, identity: &VerifiedIdentity) -> Result<CredentialPair, AppError> {
        let access_credential = self.issue_access(identity)?;
        let renewal_credential = self
            .codec
            .encode(identity, &self.keys.renewal, self.lifetimes.renewal)?;

        info!("Issued credential pair for subject {} ({})", identity.subject_id, identity.role);
        Ok(CredentialPair {
            access_credential,
            renewal_credential,
        })
    }

    pub fn issue_access(&self, identity: &VerifiedIdentity) -> Result<String, AppError> {
        self.codec.encode(identity, &self.keys.access, self.lifetimes.access)
    }

    pub(crate) fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    pub(crate) fn keys(&self) -> &CredentialKeys {
        &self.keys
    }
}
