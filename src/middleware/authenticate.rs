//! Run a strategy against the request and turn its outcome into either a
//! pass-through (with the user attached) or a response.

use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use super::AuthenticatedUser;
use crate::config::STRATEGY_NAME;
use crate::error::AppError;
use crate::registry::{SharedStrategy, StrategyRegistry};
use crate::request::AuthRequest;
use crate::strategy::Outcome;

/// Authenticate with one specific strategy.
pub async fn authenticate<U>(strategy: SharedStrategy<U>, req: Request, next: Next) -> Response
where
    U: Clone + Send + Sync + 'static,
{
    let (mut parts, body) = req.into_parts();
    let auth_request = AuthRequest::from_parts(&parts);

    match strategy.authenticate(&auth_request).await {
        Outcome::Success(user) => {
            parts.extensions.insert(AuthenticatedUser(user));
            next.run(Request::from_parts(parts, body)).await
        }
        Outcome::Redirect(location) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        Outcome::Fail(provider_failure) => {
            AppError::NotAuthenticated { provider_failure }.into_response()
        }
        Outcome::Error(e) => AppError::from(e).into_response(),
    }
}

/// Authenticate with the strategy registered under `name`.
pub async fn authenticate_named<U>(
    registry: Arc<StrategyRegistry<U>>,
    name: &str,
    req: Request,
    next: Next,
) -> Response
where
    U: Clone + Send + Sync + 'static,
{
    match registry.get(name) {
        Some(strategy) => authenticate(strategy, req, next).await,
        None => {
            tracing::error!(strategy = %name, "no strategy registered under this name");
            AppError::MissingStrategy(name.to_string()).into_response()
        }
    }
}

/// Pass requests that are already authenticated, otherwise run the
/// default `openam` strategy.
pub async fn ensure_authenticated<U>(
    registry: Arc<StrategyRegistry<U>>,
    req: Request,
    next: Next,
) -> Response
where
    U: Clone + Send + Sync + 'static,
{
    if req.extensions().get::<AuthenticatedUser<U>>().is_some() {
        return next.run(req).await;
    }
    authenticate_named(registry, STRATEGY_NAME, req, next).await
}
