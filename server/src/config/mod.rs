pub mod settings;

use tracing::info;

pub use settings::AppSettings;

use crate::error::AppError;

/// Initialize application configuration
pub fn init_config() -> Result<settings::AppSettings, AppError> {
    info!("Initializing application configuration from environment");
    settings::AppSettings::from_env()
}
