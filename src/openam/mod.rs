//! Identity-provider boundary.
//!
//! The strategy only needs three things from OpenAM: whether a token is
//! valid, the attributes behind a token, and where to send a browser to log
//! in. `IdentityProvider` captures exactly that; `client::OpenAmClient` is
//! the HTTP implementation.

pub mod attributes;
pub mod client;

use std::future::Future;
use std::time::Duration;

use crate::profile::RawAttributes;

/// Result of a validity check. `error` is advisory and does not by itself
/// make the token invalid.
#[derive(Debug)]
pub struct TokenValidity {
    pub valid: bool,
    pub error: Option<ProviderError>,
}

impl TokenValidity {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            error: None,
        }
    }

    pub fn invalid_with(error: ProviderError) -> Self {
        Self {
            valid: false,
            error: Some(error),
        }
    }
}

/// Operations the strategy performs against the identity provider.
///
/// Each call is made at most once per authentication attempt. Retries, if
/// any, belong to the implementation.
pub trait IdentityProvider: Send + Sync {
    fn is_token_valid(&self, token: &str) -> impl Future<Output = TokenValidity> + Send;

    fn get_attributes(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<RawAttributes, ProviderError>> + Send;

    /// Raw roles document for `token`, or `None` when the provider has none.
    fn get_roles(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<String>, ProviderError>> + Send;

    /// Login page URL that returns the browser to `goto` afterwards.
    fn login_ui_url(&self, goto: &str) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("status: {status} data: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}
