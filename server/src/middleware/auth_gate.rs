use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::AUTHORIZATION, Method},
    Error, HttpMessage,
};
use futures_util::future::{ok, ready, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::AppError;
use crate::models::{AuthenticatedUser, IdentityClaim, Role};
use crate::services::auth::{CredentialError, Verifier};

const BEARER_PREFIX: &str = "Bearer ";

/// Decides the disposition of one request from its Authorization header.
///
/// Pure: the same header, verifier key and clock reading always produce the
/// same outcome. The gate never attempts renewal itself.
pub fn authorize(
    authorization: Option<&str>,
    verifier: &Verifier,
    allowed_roles: Option<&[Role]>,
) -> Result<IdentityClaim, AppError> {
    let header = authorization.ok_or(AppError::MissingCredential)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::InvalidOrExpiredCredential(CredentialError::Malformed))?;

    let claim = verifier.verify_access(token)?;

    if let Some(allowed) = allowed_roles {
        if !allowed.contains(&claim.role) {
            return Err(AppError::Forbidden(format!(
                "Role '{}' is not permitted for this resource",
                claim.role
            )));
        }
    }

    Ok(claim)
}

/// Request guard requiring a valid access credential and, optionally, one of
/// a set of roles.
#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Verifier,
    allowed_roles: Option<Arc<[Role]>>,
}

impl AuthorizationGate {
    pub fn new(verifier: Verifier) -> Self {
        Self {
            verifier,
            allowed_roles: None,
        }
    }

    pub fn allow_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.allowed_roles = Some(roles.into_iter().collect());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthorizationGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthorizationGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthorizationGateMiddleware {
            service: Arc::new(service),
            verifier: self.verifier.clone(),
            allowed_roles: self.allowed_roles.clone(),
        })
    }
}

pub struct AuthorizationGateMiddleware<S> {
    service: Arc<S>,
    verifier: Verifier,
    allowed_roles: Option<Arc<[Role]>>,
}

impl<S, B> Service<ServiceRequest> for AuthorizationGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS pre-flight carries no credentials
        if req.method() == Method::OPTIONS {
            let service = Arc::clone(&self.service);
            return Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) });
        }

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default().to_string());

        match authorize(header.as_deref(), &self.verifier, self.allowed_roles.as_deref()) {
            Ok(claim) => {
                debug!("Authorized subject {} ({}) for {}", claim.sub, claim.role, req.path());
                req.extensions_mut().insert(AuthenticatedUser::from(&claim));
                let service = Arc::clone(&self.service);
                Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                warn!("Rejected {} {}: {}", req.method(), req.path(), err);
                Box::pin(ready(Ok(req.error_response(err).map_into_right_body())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use crate::models::VerifiedIdentity;
    use crate::services::auth::{CredentialCodec, CredentialKeys, FixedClock};
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use chrono::Duration;

    struct Fixture {
        verifier: Verifier,
        codec: CredentialCodec,
        keys: Arc<CredentialKeys>,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(1_800_000_000));
        let codec = CredentialCodec::new("campus-auth", clock.clone());
        let keys = Arc::new(
            CredentialKeys::from_secrets(
                "access-secret-access-secret-access-secret",
                "renewal-secret-renewal-secret-renewal-secret",
            )
            .unwrap(),
        );
        Fixture {
            verifier: Verifier::new(codec.clone(), keys.clone()),
            codec,
            keys,
            clock,
        }
    }

    impl Fixture {
        fn bearer(&self, role: Role) -> String {
            let identity = VerifiedIdentity {
                subject_id: format!("{}-1", role),
                email: "someone@school.edu".to_string(),
                role,
            };
            let token = self
                .codec
                .encode(&identity, &self.keys.access, Duration::minutes(15))
                .unwrap();
            format!("Bearer {}", token)
        }
    }

    #[::core::prelude::v1::test]
    fn test_missing_header() {
        let f = fixture();
        assert!(matches!(authorize(None, &f.verifier, None), Err(AppError::MissingCredential)));
    }

    #[::core::prelude::v1::test]
    fn test_non_bearer_header_is_malformed() {
        let f = fixture();
        for header in ["Basic dXNlcjpwYXNz", "Bearer ", "Bearer    ", "token"] {
            assert!(matches!(
                authorize(Some(header), &f.verifier, None),
                Err(AppError::InvalidOrExpiredCredential(CredentialError::Malformed))
            ));
        }
    }

    #[::core::prelude::v1::test]
    fn test_expired_credential() {
        let f = fixture();
        let header = f.bearer(Role::Student);
        f.clock.advance(15 * 60);
        assert!(matches!(
            authorize(Some(&header), &f.verifier, None),
            Err(AppError::InvalidOrExpiredCredential(CredentialError::Expired))
        ));
    }

    #[::core::prelude::v1::test]
    fn test_role_check() {
        let f = fixture();
        let teachers_only = [Role::Teacher];

        let student = f.bearer(Role::Student);
        assert!(matches!(
            authorize(Some(&student), &f.verifier, Some(&teachers_only)),
            Err(AppError::Forbidden(_))
        ));

        let teacher = f.bearer(Role::Teacher);
        let claim = authorize(Some(&teacher), &f.verifier, Some(&teachers_only)).unwrap();
        assert_eq!(claim.role, Role::Teacher);
    }

    #[::core::prelude::v1::test]
    fn test_authorize_is_repeatable() {
        let f = fixture();
        let header = f.bearer(Role::Student);
        let first = authorize(Some(&header), &f.verifier, None).unwrap();
        let second = authorize(Some(&header), &f.verifier, None).unwrap();
        assert_eq!(first, second);
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.subject_id)
    }

    #[actix_web::test]
    async fn test_gate_as_middleware() {
        let f = fixture();
        let app = test::init_service(
            App::new().service(
                web::scope("/grades")
                    .wrap(AuthorizationGate::new(f.verifier.clone()).allow_roles([Role::Teacher]))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/grades").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_type, "MissingCredential");

        let req = test::TestRequest::get()
            .uri("/grades")
            .insert_header((AUTHORIZATION, f.bearer(Role::Student)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_type, "Forbidden");

        let req = test::TestRequest::get()
            .uri("/grades")
            .insert_header((AUTHORIZATION, f.bearer(Role::Teacher)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, web::Bytes::from_static(b"teacher-1"));
    }

    #[actix_web::test]
    async fn test_gate_reports_expiry_reason() {
        let f = fixture();
        let app = test::init_service(
            App::new().service(
                web::scope("/me")
                    .wrap(AuthorizationGate::new(f.verifier.clone()))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let header = f.bearer(Role::Student);
        f.clock.advance(3600);

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION, header))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_type, "InvalidOrExpiredCredential");
        assert_eq!(body.reason.as_deref(), Some("expired"));
    }
}
