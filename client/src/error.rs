use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error body returned by the server for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Machine-readable failure kinds the session agent reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingCredential,
    InvalidOrExpiredCredential,
    Forbidden,
    InvalidCredentials,
    Renewal,
    Other,
}

impl ErrorBody {
    /// Body used when a 401/403 arrives without a parsable payload.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let error_type = match code {
            401 => "InvalidOrExpiredCredential",
            403 => "Forbidden",
            _ => "Unknown",
        };
        Self {
            code,
            message: message.into(),
            error_type: error_type.to_string(),
            reason: None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self.error_type.as_str() {
            "MissingCredential" => FailureKind::MissingCredential,
            "InvalidOrExpiredCredential" => FailureKind::InvalidOrExpiredCredential,
            "Forbidden" => FailureKind::Forbidden,
            "InvalidCredentials" => FailureKind::InvalidCredentials,
            "RenewalError" => FailureKind::Renewal,
            _ => FailureKind::Other,
        }
    }

    /// Expired credentials are renewable; tampered or unparsable ones never are.
    /// A rejection without a reason is treated as possibly expired.
    pub fn is_renewable(&self) -> bool {
        self.kind() == FailureKind::InvalidOrExpiredCredential
            && !matches!(self.reason.as_deref(), Some("invalid_signature") | Some("malformed"))
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} ({}): {}", self.error_type, reason, self.message),
            None => write!(f, "{}: {}", self.error_type, self.message),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unauthorized: {0}")]
    Unauthorized(ErrorBody),

    #[error("Forbidden: {0}")]
    Forbidden(ErrorBody),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerdeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SessionError {
    /// Maps a non-success response body onto the matching error variant.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
        match (status, parsed) {
            (401, Some(body)) => SessionError::Unauthorized(body),
            (401, None) => SessionError::Unauthorized(ErrorBody::from_status(401, "Unauthorized")),
            (403, Some(body)) => SessionError::Forbidden(body),
            (403, None) => SessionError::Forbidden(ErrorBody::from_status(403, "Forbidden")),
            (status, Some(body)) => SessionError::Server {
                status,
                message: body.message,
            },
            (status, None) => SessionError::Server {
                status,
                message: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(error: reqwest::Error) -> Self {
        SessionError::NetworkError(error.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(error: serde_json::Error) -> Self {
        SessionError::SerdeError(error.to_string())
    }
}

impl From<keyring::Error> for SessionError {
    fn from(error: keyring::Error) -> Self {
        SessionError::StorageError(error.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
