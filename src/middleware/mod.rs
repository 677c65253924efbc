//! Axum middleware wiring strategies and the role guard into a router.

pub mod authenticate;
pub mod authorize;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// The resolved user, inserted into request extensions on success.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser<U>(pub U);

/// Extract the authenticated user put there by the authentication middleware.
impl<S, U> FromRequestParts<S> for AuthenticatedUser<U>
where
    S: Send + Sync,
    U: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser<U>>()
            .cloned()
            .ok_or(AppError::NotAuthenticated {
                provider_failure: None,
            })
    }
}
