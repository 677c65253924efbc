//! Demo server: three named OpenAM strategies behind an Axum router.
//!
//! Configuration comes from the environment (and `.env` when present).
//! Set `LOG_FORMAT=json` for structured log lines.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use openam_strategy::config::AppConfig;
use openam_strategy::{AppState, build_registry, create_app};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = match build_registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("Failed to configure strategies: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(strategies = ?registry.names(), "strategies registered");

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState {
        registry: Arc::new(registry),
    });
    let app = create_app(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Starting local server on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
