use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use super::identity_claim::{IdentityClaim, IdentitySummary, Role};

/// Identity attached to the request by the authorization gate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
}

impl From<&IdentityClaim> for AuthenticatedUser {
    fn from(claim: &IdentityClaim) -> Self {
        Self {
            subject_id: claim.sub.clone(),
            email: claim.email.clone(),
            role: claim.role,
        }
    }
}

impl From<&AuthenticatedUser> for IdentitySummary {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            subject_id: user.subject_id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthenticatedUser>() {
            ready(Ok(user.clone()))
        } else {
            log::error!("AuthenticatedUser not found in request extensions for path: {}", req.path());
            ready(Err(actix_web::error::ErrorInternalServerError(
                "Authentication context not found",
            )))
        }
    }
}
