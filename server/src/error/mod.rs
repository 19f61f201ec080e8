use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

use crate::services::auth::{CredentialError, RenewalError};

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    Configuration(String),
    BadRequest(String),
    /// No Authorization header on a protected call
    MissingCredential,
    /// Access credential present but unusable; the inner kind says why
    InvalidOrExpiredCredential(CredentialError),
    Forbidden(String),
    InvalidCredentials,
    Renewal(RenewalError),
}

/// Wire format of every error response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AppError {
    /// Machine-readable kind surfaced to clients as `errorType`.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "InternalError",
            AppError::Configuration(_) => "ConfigurationError",
            AppError::BadRequest(_) => "BadRequest",
            AppError::MissingCredential => "MissingCredential",
            AppError::InvalidOrExpiredCredential(_) => "InvalidOrExpiredCredential",
            AppError::Forbidden(_) => "Forbidden",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::Renewal(_) => "RenewalError",
        }
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AppError::InvalidOrExpiredCredential(e) => Some(e.reason()),
            AppError::Renewal(e) => Some(e.reason()),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::MissingCredential => write!(f, "Missing Authorization header"),
            AppError::InvalidOrExpiredCredential(e) => write!(f, "Invalid or expired credential: {}", e),
            AppError::Forbidden(e) => write!(f, "Forbidden: {}", e),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::Renewal(e) => write!(f, "Renewal failed: {}", e),
        }
    }
}

impl StdError for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        let error_response = ErrorResponse {
            code: status_code.as_u16(),
            message: self.to_string(),
            error_type: self.error_type().to_string(),
            reason: self.reason().map(str::to_string),
        };

        HttpResponse::build(status_code).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCredential => StatusCode::UNAUTHORIZED,
            AppError::InvalidOrExpiredCredential(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Renewal(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(error: CredentialError) -> Self {
        AppError::InvalidOrExpiredCredential(error)
    }
}

impl From<RenewalError> for AppError {
    fn from(error: RenewalError) -> Self {
        AppError::Renewal(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON deserialization/serialization error: {}", error))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_expired_credential_response_body() {
        let err = AppError::InvalidOrExpiredCredential(CredentialError::Expired);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body()).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.code, 401);
        assert_eq!(parsed.error_type, "InvalidOrExpiredCredential");
        assert_eq!(parsed.reason.as_deref(), Some("expired"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MissingCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("role".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Renewal(RenewalError::Invalid).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::MissingCredential.reason(), None);
    }
}
