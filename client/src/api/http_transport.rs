use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;

use super::transport::Transport;
use super::types::{ApiRequest, ApiResponse, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
use crate::constants::{LOGIN_PATH, REFRESH_PATH};
use crate::error::SessionResult;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, access_credential: Option<&str>) -> SessionResult<ApiResponse> {
        let mut builder = self.client.request(request.method.clone(), self.url(&request.path));
        if let Some(token) = access_credential {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!("{} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse::new(status, body.to_vec()))
    }

    async fn login(&self, email: &str, password: &str) -> SessionResult<LoginResponse> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        if status != 200 {
            warn!("Login rejected with status {}", status);
        }
        ApiResponse::new(status, body.to_vec()).json()
    }

    async fn renew(&self, renewal_credential: &str) -> SessionResult<String> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { renewal_credential })
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let refreshed: RefreshResponse = ApiResponse::new(status, body.to_vec()).json()?;
        Ok(refreshed.access_credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_attaches_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/me")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url());
        let response = transport
            .send(&ApiRequest::get("/api/auth/me"), Some("tok-1"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_without_credential_has_no_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/me")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .with_body(r#"{"code":401,"message":"Missing","errorType":"MissingCredential"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url());
        let response = transport.send(&ApiRequest::get("/api/auth/me"), None).await.unwrap();

        assert_eq!(response.auth_failure().unwrap().error_type, "MissingCredential");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_renew_posts_renewal_credential() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/refresh")
            .match_body(Matcher::Json(json!({"renewalCredential": "ren-1"})))
            .with_status(200)
            .with_body(r#"{"accessCredential":"acc-2"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&format!("{}/", server.url()));
        assert_eq!(transport.renew("ren-1").await.unwrap(), "acc-2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_renew_failure_maps_to_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .with_body(r#"{"code":401,"message":"Renewal failed","errorType":"RenewalError","reason":"expired"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url());
        match transport.renew("ren-1").await {
            Err(SessionError::Unauthorized(body)) => assert_eq!(body.reason.as_deref(), Some("expired")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_parses_pair() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/login")
            .match_body(Matcher::Json(json!({"email": "ada@school.edu", "password": "pw"})))
            .with_status(200)
            .with_body(
                r#"{"accessCredential":"a","renewalCredential":"r",
                    "identitySummary":{"subjectId":"s-1","email":"ada@school.edu","role":"student"}}"#,
            )
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url());
        let login = transport.login("ada@school.edu", "pw").await.unwrap();
        assert_eq!(login.access_credential, "a");
        assert_eq!(login.renewal_credential, "r");
    }
}
