//! GET /health

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::types::HealthResponse;

/// Health check: OK plus the registered strategy names.
pub async fn health(State(state): State<Arc<crate::AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        strategies: state
            .registry
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}
