//! Response DTOs for the demo routes.

use serde::Serialize;

/// GET /health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub strategies: Vec<String>,
}

/// GET / response.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub links: Vec<String>,
}
