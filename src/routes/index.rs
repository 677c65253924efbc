//! GET /

use axum::Json;

use crate::types::IndexResponse;

/// Unprotected landing page listing the protected routes.
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        links: ["/protected", "/fetch", "/ignore", "/admin"]
            .into_iter()
            .map(String::from)
            .collect(),
    })
}
