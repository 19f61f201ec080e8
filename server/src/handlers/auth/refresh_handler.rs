use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{AppState, RefreshRequest, RefreshResponse};

/// Exchanges a renewal credential for a new access credential.
pub async fn refresh(
    payload: web::Json<RefreshRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let access_credential = app_state.auth.renewal.renew(&payload.renewal_credential)?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access_credential }))
}
