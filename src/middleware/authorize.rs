//! Role guard: the caller must hold at least one of the required roles.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use super::AuthenticatedUser;
use crate::error::AuthorizationError;
use crate::ocsf;
use crate::profile::HasGroups;

/// Allow if `user` is present and any required role is among its groups.
pub fn ensure_authorized<U: HasGroups>(
    user: Option<&U>,
    required_roles: &[String],
) -> Result<(), AuthorizationError> {
    let user = user.ok_or_else(AuthorizationError::unauthenticated)?;
    let groups = user.groups();
    if required_roles.iter().any(|role| groups.contains(role)) {
        ocsf::authorization_event(required_roles, groups, "permit");
        Ok(())
    } else {
        ocsf::authorization_event(required_roles, groups, "deny");
        Err(AuthorizationError::unauthorized(required_roles))
    }
}

/// Axum middleware form of [`ensure_authorized`].
pub async fn require_roles<U>(
    required_roles: Arc<[String]>,
    req: Request,
    next: Next,
) -> Result<Response, AuthorizationError>
where
    U: HasGroups + Clone + Send + Sync + 'static,
{
    let user = req.extensions().get::<AuthenticatedUser<U>>().map(|u| &u.0);
    ensure_authorized(user, &required_roles)?;
    Ok(next.run(req).await)
}
