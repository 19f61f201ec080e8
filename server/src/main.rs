use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

use campus_auth_server::auth_stores::{CredentialChecker, InMemoryDirectory};
use campus_auth_server::config;
use campus_auth_server::routes::configure_app;
use campus_auth_server::services::auth::SystemClock;
use campus_auth_server::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_settings = match config::init_config() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            std::process::exit(1);
        }
    };

    let directory: Arc<dyn CredentialChecker> = match &app_settings.auth.user_directory_path {
        Some(path) => match InMemoryDirectory::from_file(Path::new(path)) {
            Ok(directory) => Arc::new(directory),
            Err(e) => {
                log::error!("Failed to load user directory: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("USER_DIRECTORY_PATH not set; every login will be rejected");
            Arc::new(InMemoryDirectory::default())
        }
    };

    let app_state = match AppState::new(app_settings, Arc::new(SystemClock), directory) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize credential services: {}", e);
            log::error!("Cannot start server without working signing keys");
            std::process::exit(1);
        }
    };

    let host = app_state.settings.server.host.clone();
    let port = app_state.settings.server.port;
    log::info!(
        "Starting {} ({}) at http://{}:{}",
        app_state.settings.app.name,
        app_state.settings.app.environment,
        host,
        port
    );

    let listener = TcpListener::bind(format!("{}:{}", host, port))?;

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let verifier = app_state.auth.verifier.clone();

        let mut cors = Cors::default();
        if app_state.settings.server.cors_origins.iter().any(|o| o == "*") {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_state.settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(app_state))
            .configure(|cfg| configure_app(cfg, &verifier))
    })
    .listen(listener)?
    .run()
    .await
}
