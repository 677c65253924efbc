//! OpenAM single-sign-on authentication strategy for Axum.
//!
//! A strategy reads the OpenAM session cookie, validates it against the
//! identity provider, optionally loads the user's attributes and groups,
//! hands the result to an application verify callback, and reports exactly
//! one outcome: success, redirect to login, fail, or error.
//!
//! The crate also ships a small demo router (`create_app`) wiring several
//! named strategies and the role guard together.

pub mod config;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod ocsf;
pub mod openam;
pub mod profile;
pub mod registry;
pub mod request;
pub mod routes;
pub mod strategy;
pub mod types;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ConfigError, STRATEGY_NAME};
use crate::error::BoxError;
use crate::middleware::authenticate::{authenticate_named, ensure_authenticated};
use crate::middleware::authorize::require_roles;
use crate::profile::Identity;
use crate::registry::StrategyRegistry;
use crate::strategy::OpenAmStrategy;

pub use crate::config::{StrategyConfig, StrategyOptions};
pub use crate::strategy::{Outcome, Strategy};

pub const FETCH_STRATEGY: &str = "openam-fetch";
pub const NO_FETCH_STRATEGY: &str = "openam-do-not-fetch";

/// Shared application state available to all route handlers.
pub struct AppState {
    pub registry: Arc<StrategyRegistry<Identity>>,
}

/// Verify callback used by the demo: the identity is the user.
pub async fn accept_identity(identity: Identity) -> Result<Identity, BoxError> {
    Ok(identity)
}

/// Register the demo strategies against the configured OpenAM server.
pub fn build_registry(config: &AppConfig) -> Result<StrategyRegistry<Identity>, ConfigError> {
    let mut registry = StrategyRegistry::new();
    registry
        .register(OpenAmStrategy::with_client(
            config.strategy_options(STRATEGY_NAME, true),
            accept_identity,
        )?)
        .register(OpenAmStrategy::with_client(
            config.strategy_options(FETCH_STRATEGY, true),
            accept_identity,
        )?)
        .register(OpenAmStrategy::with_client(
            config.strategy_options(NO_FETCH_STRATEGY, false),
            accept_identity,
        )?);
    Ok(registry)
}

/// Build the Axum router with all middleware and routes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let registry = state.registry.clone();

    // Already-authenticated requests pass; others go through "openam"
    let protected = {
        let registry = registry.clone();
        Router::new()
            .route("/protected", get(routes::identity::identity))
            .layer(from_fn(move |req, next| {
                let registry = registry.clone();
                ensure_authenticated(registry, req, next)
            }))
    };

    let fetch = {
        let registry = registry.clone();
        Router::new()
            .route("/fetch", get(routes::identity::identity))
            .layer(from_fn(move |req, next| {
                let registry = registry.clone();
                authenticate_named(registry, FETCH_STRATEGY, req, next)
            }))
    };

    let ignore = {
        let registry = registry.clone();
        Router::new()
            .route("/ignore", get(routes::identity::identity))
            .layer(from_fn(move |req, next| {
                let registry = registry.clone();
                authenticate_named(registry, NO_FETCH_STRATEGY, req, next)
            }))
    };

    // Role guard runs after authentication (outer layer runs first)
    let admin = {
        let required: Arc<[String]> = Arc::from(vec!["admin".to_string()]);
        Router::new()
            .route("/admin", get(routes::identity::identity))
            .layer(from_fn(move |req, next| {
                require_roles::<Identity>(required.clone(), req, next)
            }))
            .layer(from_fn(move |req, next| {
                let registry = registry.clone();
                authenticate_named(registry, STRATEGY_NAME, req, next)
            }))
    };

    Router::new()
        .route("/", get(routes::index::index))
        .route("/health", get(routes::health::health))
        .merge(protected)
        .merge(fetch)
        .merge(ignore)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
