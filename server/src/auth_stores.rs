use actix_web::web;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::AppError;
use crate::models::{Role, VerifiedIdentity};

/// Black-box password check yielding a verified identity.
#[async_trait]
pub trait CredentialChecker: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedIdentity, AppError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
    /// Argon2 PHC string
    pub password_hash: String,
}

const DECOY_SALT: &str = "ZGVjb3lzYWx0ZGVjb3lzYWx0";

/// Read-only user directory held in memory, keyed by lowercased email.
///
/// Unknown emails are checked against a decoy hash so they cost the same
/// argon2 work as a wrong password.
#[derive(Debug)]
pub struct InMemoryDirectory {
    entries: HashMap<String, DirectoryEntry>,
    decoy_hash: Option<String>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InMemoryDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.email.to_lowercase(), entry))
            .collect();
        let decoy_hash = decoy_hash();
        if decoy_hash.is_none() {
            warn!("Could not derive decoy password hash; unknown emails will be rejected without hashing");
        }
        Self { entries, decoy_hash }
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let entries: Vec<DirectoryEntry> = serde_json::from_str(json)
            .map_err(|e| AppError::Configuration(format!("Invalid user directory: {}", e)))?;
        Ok(Self::new(entries))
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read user directory {}: {}", path.display(), e))
        })?;
        let directory = Self::from_json(&contents)?;
        info!("Loaded {} user directory entries from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn decoy_hash() -> Option<String> {
    let salt = SaltString::from_b64(DECOY_SALT).ok()?;
    Argon2::default()
        .hash_password(b"campus-auth-decoy", &salt)
        .ok()
        .map(|hash| hash.to_string())
}

fn password_matches(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

#[async_trait]
impl CredentialChecker for InMemoryDirectory {
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedIdentity, AppError> {
        let entry = self.entries.get(&email.to_lowercase());

        let stored_hash = match (entry, &self.decoy_hash) {
            (Some(entry), _) => entry.password_hash.clone(),
            (None, Some(decoy)) => decoy.clone(),
            (None, None) => {
                debug!("Login attempt for unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        // Argon2 is CPU-bound; keep it off the worker thread.
        let password = password.to_string();
        let matches = web::block(move || password_matches(&stored_hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("Password check did not complete: {}", e)))?;

        match entry {
            Some(entry) if matches => Ok(VerifiedIdentity {
                subject_id: entry.subject_id.clone(),
                email: entry.email.clone(),
                role: entry.role,
            }),
            Some(entry) => {
                debug!("Password mismatch for subject {}", entry.subject_id);
                Err(AppError::InvalidCredentials)
            }
            None => {
                debug!("Login attempt for unknown email");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}
