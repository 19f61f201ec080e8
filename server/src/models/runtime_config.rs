use std::sync::Arc;

use crate::auth_stores::CredentialChecker;
use crate::config::AppSettings;
use crate::error::AppError;
use crate::services::auth::{AuthServices, Clock};

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub auth: AuthServices,
    pub directory: Arc<dyn CredentialChecker>,
}

impl AppState {
    pub fn new(
        settings: AppSettings,
        clock: Arc<dyn Clock>,
        directory: Arc<dyn CredentialChecker>,
    ) -> Result<Self, AppError> {
        let auth = AuthServices::from_settings(&settings, clock)?;
        Ok(Self {
            settings: Arc::new(settings),
            auth,
            directory,
        })
    }
}
