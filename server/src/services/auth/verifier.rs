use std::sync::Arc;

use super::codec::{CredentialCodec, CredentialError};
use super::keys::CredentialKeys;
use crate::models::IdentityClaim;

/// Validates access credentials. Stateless; clone freely across workers.
#[derive(Debug, Clone)]
pub struct Verifier {
    codec: CredentialCodec,
    keys: Arc<CredentialKeys>,
}

impl Verifier {
    pub fn new(codec: CredentialCodec, keys: Arc<CredentialKeys>) -> Self {
        Self { codec, keys }
    }

    pub fn verify_access(&self, token: &str) -> Result<IdentityClaim, CredentialError> {
        self.codec.decode(token, &self.keys.access)
    }
}
