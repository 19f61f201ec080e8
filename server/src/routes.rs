use actix_web::web;

use crate::error::AppError;
use crate::handlers;
use crate::middleware::AuthorizationGate;
use crate::models::Role;
use crate::services::auth::Verifier;

/// Mounts every route: public health and auth endpoints plus the gated `/api` scope.
pub fn configure_app(cfg: &mut web::ServiceConfig, verifier: &Verifier) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }));

    cfg.service(
        web::resource("/health")
            .route(web::get().to(handlers::health::health_check)),
    );
    cfg.service(
        web::scope("/auth")
            .configure(configure_public_auth_routes),
    );
    cfg.service(
        web::scope("/api")
            .wrap(AuthorizationGate::new(verifier.clone()))
            .configure(configure_routes)
            .service(
                web::scope("/teacher")
                    .wrap(AuthorizationGate::new(verifier.clone()).allow_roles([Role::Teacher]))
                    .configure(configure_teacher_routes),
            ),
    );
}

/// Issue and renew. Mounted under "/auth"; no credential required.
pub fn configure_public_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(handlers::auth::login));
    cfg.route("/refresh", web::post().to(handlers::auth::refresh));
}

/// Routes open to any authenticated role. Mounted under "/api".
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth") // Base path: /api/auth
            .route("/me", web::get().to(handlers::auth::get_user_info)),
    );
}

/// Routes restricted to teachers. Mounted under "/api/teacher".
pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/whoami", web::get().to(handlers::auth::get_user_info));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_stores::test_support::hash;
    use crate::auth_stores::{DirectoryEntry, InMemoryDirectory};
    use crate::config::AppSettings;
    use crate::error::ErrorResponse;
    use crate::models::{AppState, IdentitySummary, LoginResponse, RefreshResponse};
    use crate::services::auth::FixedClock;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    const T0: i64 = 1_760_000_000;

    fn state(clock: Arc<FixedClock>) -> AppState {
        let settings = AppSettings::from_lookup(|key| match key {
            "ACCESS_CREDENTIAL_SECRET" => Some("access-secret-access-secret-access-secret".to_string()),
            "RENEWAL_CREDENTIAL_SECRET" => Some("renewal-secret-renewal-secret-renewal-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let directory = InMemoryDirectory::new(vec![
            DirectoryEntry {
                subject_id: "s-100".to_string(),
                email: "ada@school.edu".to_string(),
                role: Role::Student,
                password_hash: hash("student-pass"),
            },
            DirectoryEntry {
                subject_id: "t-200".to_string(),
                email: "grace@school.edu".to_string(),
                role: Role::Teacher,
                password_hash: hash("teacher-pass"),
            },
        ]);
        AppState::new(settings, clock, Arc::new(directory)).unwrap()
    }

    macro_rules! app {
        ($state:expr) => {{
            let state = $state;
            let verifier = state.auth.verifier.clone();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .configure(|cfg| configure_app(cfg, &verifier)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health_is_public() {
        let app = app!(state(Arc::new(FixedClock::new(T0))));
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_login_rejects_bad_password() {
        let app = app!(state(Arc::new(FixedClock::new(T0))));
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "ada@school.edu", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_type, "InvalidCredentials");
    }

    #[actix_web::test]
    async fn test_login_expire_refresh_flow() {
        let clock = Arc::new(FixedClock::new(T0));
        let app = app!(state(Arc::clone(&clock)));

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "ada@school.edu", "password": "student-pass"}))
            .to_request();
        let login: LoginResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            login.identity_summary,
            IdentitySummary {
                subject_id: "s-100".to_string(),
                email: "ada@school.edu".to_string(),
                role: Role::Student,
            }
        );

        let me = |token: &str| {
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
                .to_request()
        };

        let resp = test::call_service(&app, me(&login.access_credential)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // Past the 15 minute access TTL
        clock.advance(16 * 60);
        let resp = test::call_service(&app, me(&login.access_credential)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_type, "InvalidOrExpiredCredential");
        assert_eq!(body.reason.as_deref(), Some("expired"));

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({"renewalCredential": login.renewal_credential}))
            .to_request();
        let refreshed: RefreshResponse = test::call_and_read_body_json(&app, req).await;

        let summary: IdentitySummary =
            test::call_and_read_body_json(&app, me(&refreshed.access_credential)).await;
        assert_eq!(summary.subject_id, "s-100");
        assert_eq!(summary.role, Role::Student);
    }

    #[actix_web::test]
    async fn test_refresh_with_access_credential_fails() {
        let app = app!(state(Arc::new(FixedClock::new(T0))));
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "grace@school.edu", "password": "teacher-pass"}))
            .to_request();
        let login: LoginResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({"renewalCredential": login.access_credential}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_type, "RenewalError");
        assert_eq!(body.reason.as_deref(), Some("invalid"));
    }

    #[actix_web::test]
    async fn test_refresh_rejects_malformed_body() {
        let app = app!(state(Arc::new(FixedClock::new(T0))));
        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({"token": "x"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_teacher_scope_is_role_gated() {
        let app = app!(state(Arc::new(FixedClock::new(T0))));

        let login_as = |email: &str, password: &str| {
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({"email": email, "password": password}))
                .to_request()
        };
        let whoami = |token: &str| {
            test::TestRequest::get()
                .uri("/api/teacher/whoami")
                .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
                .to_request()
        };

        let student: LoginResponse =
            test::call_and_read_body_json(&app, login_as("ada@school.edu", "student-pass")).await;
        let resp = test::call_service(&app, whoami(&student.access_credential)).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let teacher: LoginResponse =
            test::call_and_read_body_json(&app, login_as("grace@school.edu", "teacher-pass")).await;
        let resp = test::call_service(&app, whoami(&teacher.access_credential)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/teacher/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
