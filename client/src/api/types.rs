use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{ErrorBody, SessionError, SessionResult};

/// A protected call, reusable for the single retry after renewal.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server's authorization failure, if this response carries one.
    pub fn auth_failure(&self) -> Option<ErrorBody> {
        if self.status != 401 && self.status != 403 {
            return None;
        }
        Some(
            serde_json::from_slice::<ErrorBody>(&self.body)
                .unwrap_or_else(|_| ErrorBody::from_status(self.status, String::from_utf8_lossy(&self.body))),
        )
    }

    pub fn json<T: DeserializeOwned>(&self) -> SessionResult<T> {
        if !self.is_success() {
            return Err(SessionError::from_response(self.status, &self.body));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_credential: String,
    pub renewal_credential: String,
    pub identity_summary: IdentitySummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub renewal_credential: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_credential: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_only_for_401_and_403() {
        assert_eq!(ApiResponse::new(200, "{}").auth_failure(), None);
        assert_eq!(ApiResponse::new(500, "boom").auth_failure(), None);

        let failure = ApiResponse::new(401, "plain text").auth_failure().unwrap();
        assert_eq!(failure.error_type, "InvalidOrExpiredCredential");
        assert_eq!(failure.reason, None);

        let body = r#"{"code":401,"message":"m","errorType":"MissingCredential"}"#;
        let failure = ApiResponse::new(401, body).auth_failure().unwrap();
        assert_eq!(failure.error_type, "MissingCredential");
    }

    #[test]
    fn test_login_response_wire_names() {
        let json = r#"{
            "accessCredential": "a",
            "renewalCredential": "r",
            "identitySummary": {"subjectId": "s-1", "email": "e@x.edu", "role": "teacher"}
        }"#;
        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.identity_summary.role, Role::Teacher);
    }
}
