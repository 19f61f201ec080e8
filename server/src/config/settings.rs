use std::env;
use std::fmt;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Also stamped into every credential as the `iss` claim
    pub name: String,
    pub environment: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub renewal_secret: String,
    pub access_ttl_minutes: i64,
    pub renewal_ttl_days: i64,
    pub user_directory_path: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"<redacted>")
            .field("renewal_secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("renewal_ttl_days", &self.renewal_ttl_days)
            .field("user_directory_path", &self.user_directory_path)
            .finish()
    }
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // App config
        let app_name = lookup("APP_NAME").unwrap_or_else(|| "campus-auth".to_string());
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        // Server config
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth config
        let access_secret = lookup("ACCESS_CREDENTIAL_SECRET")
            .ok_or_else(|| AppError::Configuration("ACCESS_CREDENTIAL_SECRET must be set".to_string()))?;

        let renewal_secret = lookup("RENEWAL_CREDENTIAL_SECRET")
            .ok_or_else(|| AppError::Configuration("RENEWAL_CREDENTIAL_SECRET must be set".to_string()))?;

        let access_ttl_minutes = parse_positive(&lookup, "ACCESS_CREDENTIAL_TTL_MINUTES", 15)?;
        let renewal_ttl_days = parse_positive(&lookup, "RENEWAL_CREDENTIAL_TTL_DAYS", 14)?;

        let user_directory_path = lookup("USER_DIRECTORY_PATH").filter(|p| !p.trim().is_empty());

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            auth: AuthConfig {
                access_secret,
                renewal_secret,
                access_ttl_minutes,
                renewal_ttl_days,
                user_directory_path,
            },
        })
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: i64) -> Result<i64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| AppError::Configuration(format!("{} must be a valid number", key)))?,
        None => default,
    };

    if value <= 0 {
        return Err(AppError::Configuration(format!("{} must be greater than zero", key)));
    }
    Ok(value)
}
