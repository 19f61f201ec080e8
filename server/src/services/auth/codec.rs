use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, error, trace};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::clock::Clock;
use crate::error::AppError;
use crate::models::{IdentityClaim, VerifiedIdentity};

/// Why a credential failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential could not be parsed")]
    Malformed,
    #[error("credential signature does not match")]
    InvalidSignature,
    #[error("credential has expired")]
    Expired,
}

impl CredentialError {
    pub fn reason(&self) -> &'static str {
        match self {
            CredentialError::Malformed => "malformed",
            CredentialError::InvalidSignature => "invalid_signature",
            CredentialError::Expired => "expired",
        }
    }

    /// Only an expired credential is worth exchanging for a new one.
    pub fn is_renewable(&self) -> bool {
        matches!(self, CredentialError::Expired)
    }
}

/// HS256 signing key, holding both halves derived from one secret.
#[derive(Clone)]
pub struct CredentialKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl CredentialKey {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialKey(<redacted>)")
    }
}

/// Signs identity claims into compact JWTs and verifies them back.
#[derive(Debug, Clone)]
pub struct CredentialCodec {
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl CredentialCodec {
    pub fn new(issuer: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: issuer.into(),
            clock,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Stamps `iat = now`, `exp = now + ttl` and signs with `key`.
    pub fn encode(
        &self,
        identity: &VerifiedIdentity,
        key: &CredentialKey,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let iat = self.clock.now();
        let exp = iat
            .checked_add(ttl.num_seconds())
            .ok_or_else(|| AppError::Internal("Failed to calculate credential expiration time".to_string()))?;

        let claims = IdentityClaim {
            sub: identity.subject_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat,
            exp,
            iss: self.issuer.clone(),
        };

        debug!("Signing credential for subject {} (exp: {})", claims.sub, exp);
        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding).map_err(|e| {
            error!("Failed to sign credential: {}", e);
            AppError::Internal(format!("Credential signing failed: {}", e))
        })
    }

    /// Verifies the signature, then checks `exp` against the trusted clock.
    pub fn decode(&self, token: &str, key: &CredentialKey) -> Result<IdentityClaim, CredentialError> {
        trace!("Decoding credential");

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against our own clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp", "iss"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data = decode::<IdentityClaim>(token, &key.decoding, &validation).map_err(|err| {
            debug!("Credential rejected: {:?}", err.kind());
            match err.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidIssuer => CredentialError::InvalidSignature,
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Malformed,
            }
        })?;

        let claims = token_data.claims;
        if claims.exp <= claims.iat {
            return Err(CredentialError::Malformed);
        }
        if self.clock.now() >= claims.exp {
            debug!("Credential for subject {} expired at {}", claims.sub, claims.exp);
            return Err(CredentialError::Expired);
        }

        Ok(claims)
    }
}
