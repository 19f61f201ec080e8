use actix_web::{web, HttpResponse};
use log::{info, warn};

use crate::error::AppError;
use crate::models::{AppState, IdentitySummary, LoginRequest, LoginResponse};

/// Verifies the caller's password and mints a fresh credential pair.
pub async fn login(
    payload: web::Json<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".to_string()));
    }

    let identity = app_state
        .directory
        .verify(request.email.trim(), &request.password)
        .await
        .inspect_err(|_| warn!("Login failed"))?;

    let pair = app_state.auth.issuer.issue(&identity)?;
    info!("User {} logged in", identity.subject_id);

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_credential: pair.access_credential,
        renewal_credential: pair.renewal_credential,
        identity_summary: IdentitySummary::from(&identity),
    }))
}
