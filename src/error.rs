//! Error types with Axum response mapping.
//!
//! Each rejection maps to a specific HTTP status + JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::openam::ProviderError;
use crate::strategy::ProviderFailure;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unexpected failure during authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{message} ({source})")]
    Provider {
        message: String,
        #[source]
        source: ProviderError,
    },

    #[error("{message} ({source})")]
    Verify {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl AuthError {
    pub fn provider(message: impl Into<String>, source: ProviderError) -> Self {
        AuthError::Provider {
            message: message.into(),
            source,
        }
    }

    pub fn verify(message: impl Into<String>, source: BoxError) -> Self {
        AuthError::Verify {
            message: message.into(),
            source,
        }
    }
}

/// Why the authorization guard turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationCode {
    Unauthenticated,
    Unauthorized,
}

impl AuthorizationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationCode::Unauthenticated => "unauthenticated",
            AuthorizationCode::Unauthorized => "unauthorized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthorizationError {
    pub code: AuthorizationCode,
    pub message: String,
}

impl AuthorizationError {
    pub fn unauthenticated() -> Self {
        Self {
            code: AuthorizationCode::Unauthenticated,
            message: "Not authenticated".into(),
        }
    }

    pub fn unauthorized(required: &[String]) -> Self {
        Self {
            code: AuthorizationCode::Unauthorized,
            message: format!("Requires one of roles: {}", required.join(", ")),
        }
    }

    pub fn status(&self) -> StatusCode {
        // Both codes share 401; `code` in the body tells them apart.
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthorizationError {
    fn into_response(self) -> Response {
        let body = json!({"error": self.message, "code": self.code.as_str()});
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Rejections produced by the authentication middleware.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated {
        provider_failure: Option<ProviderFailure>,
    },

    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error("Incorrect strategy configuration.")]
    MissingStrategy(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotAuthenticated { provider_failure } => {
                let mut body = json!({"error": "Not authenticated"});
                if let Some(failure) = provider_failure {
                    body["provider_error"] = json!(failure.error);
                    if let Some(description) = &failure.description {
                        body["provider_error_description"] = json!(description);
                    }
                }
                (StatusCode::UNAUTHORIZED, body)
            }
            AppError::Authentication(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Authentication failed", "message": e.to_string()}),
            ),
            AppError::MissingStrategy(name) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string(), "strategy": name}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
