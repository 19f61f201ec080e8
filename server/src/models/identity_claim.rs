use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// An identity that has already passed the upstream credential check.
///
/// Carries no timestamps: freshness is only ever stamped by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
}

/// JWT claims carried by both access and renewal credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Subject (opaque principal id)
    pub sub: String,
    /// Informational only, never used for authorization
    pub email: String,
    pub role: Role,
    /// Issued at (UTC seconds)
    pub iat: i64,
    /// Expiration time (UTC seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl IdentityClaim {
    /// Drops the timestamps, leaving only what may be carried into a new credential.
    pub fn identity(&self) -> VerifiedIdentity {
        VerifiedIdentity {
            subject_id: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
}

impl From<&VerifiedIdentity> for IdentitySummary {
    fn from(identity: &VerifiedIdentity) -> Self {
        Self {
            subject_id: identity.subject_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
        }
    }
}
