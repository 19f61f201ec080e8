use actix_web::HttpResponse;

use crate::error::AppError;
use crate::models::{AuthenticatedUser, IdentitySummary};

/// Handler for getting user information from a validated access credential
pub async fn get_user_info(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(IdentitySummary::from(&user)))
}
