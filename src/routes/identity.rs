//! GET /protected, /fetch, /ignore, /admin

use axum::Json;

use crate::middleware::AuthenticatedUser;
use crate::profile::Identity;

/// Echo the identity the strategy resolved for this request.
pub async fn identity(AuthenticatedUser(identity): AuthenticatedUser<Identity>) -> Json<Identity> {
    Json(identity)
}
