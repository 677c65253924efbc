//! The OpenAM authentication strategy.
//!
//! One call to [`Strategy::authenticate`] runs the whole chain for one
//! request and returns exactly one [`Outcome`]:
//!
//! ```text
//! provider error in query ─────────────────────────────────▶ Fail
//! token missing / invalid ──▶ redirect enabled? ──yes──────▶ Redirect
//!                                              └──no───────▶ Fail
//! token valid ──▶ load (nothing | profile | attributes+roles)
//!             ──▶ verify callback ──ok─────────────────────▶ Success
//!                                 └──err / provider err────▶ Error
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::config::{ConfigError, LoadMode, StrategyConfig, StrategyOptions};
use crate::error::{AuthError, BoxError};
use crate::logger::StrategyLogger;
use crate::ocsf;
use crate::openam::client::OpenAmClient;
use crate::openam::{IdentityProvider, ProviderError};
use crate::profile::{Identity, NormalizedProfile, ResolvedIdentity};
use crate::request::AuthRequest;

/// Terminal signal of one authentication attempt.
#[derive(Debug)]
pub enum Outcome<U> {
    /// Identity resolved and accepted by the verify callback.
    Success(U),
    /// Send the browser to the identity provider's login page.
    Redirect(String),
    /// Unauthenticated. Carries the provider's own error when it sent one back.
    Fail(Option<ProviderFailure>),
    /// Provider, network, or verify-callback failure.
    Error(AuthError),
}

impl<U> Outcome<U> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Redirect(_) => "redirect",
            Outcome::Fail(_) => "fail",
            Outcome::Error(_) => "error",
        }
    }
}

/// Error details the identity provider put in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub error: String,
    pub description: Option<String>,
}

/// Application hook mapping a resolved identity to an application user.
pub trait Verifier: Send + Sync {
    type User: Send;

    fn verify(
        &self,
        identity: Identity,
    ) -> impl Future<Output = Result<Self::User, BoxError>> + Send;
}

impl<F, Fut, U, E> Verifier for F
where
    F: Fn(Identity) -> Fut + Send + Sync,
    Fut: Future<Output = Result<U, E>> + Send,
    U: Send,
    E: Into<BoxError>,
{
    type User = U;

    fn verify(&self, identity: Identity) -> impl Future<Output = Result<U, BoxError>> + Send {
        let fut = self(identity);
        async move { fut.await.map_err(Into::into) }
    }
}

/// A named, pluggable authentication strategy.
#[async_trait]
pub trait Strategy: Send + Sync {
    type User: Send;

    fn name(&self) -> &str;

    async fn authenticate(&self, request: &AuthRequest) -> Outcome<Self::User>;
}

pub struct OpenAmStrategy<P, V> {
    config: StrategyConfig,
    provider: P,
    verifier: V,
    logger: Arc<dyn StrategyLogger>,
}

impl<V: Verifier> OpenAmStrategy<OpenAmClient, V> {
    /// Strategy talking to OpenAM over HTTP.
    pub fn with_client(options: StrategyOptions, verifier: V) -> Result<Self, ConfigError> {
        let config = StrategyConfig::sanitize(options)?;
        let client =
            OpenAmClient::from_config(&config).map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self::from_config(config, client, verifier))
    }
}

impl<P: IdentityProvider, V: Verifier> OpenAmStrategy<P, V> {
    /// Validate `options` and build the strategy. Fails fast on bad config.
    pub fn new(options: StrategyOptions, provider: P, verifier: V) -> Result<Self, ConfigError> {
        Ok(Self::from_config(
            StrategyConfig::sanitize(options)?,
            provider,
            verifier,
        ))
    }

    pub fn from_config(config: StrategyConfig, provider: P, verifier: V) -> Self {
        let logger = config.logger.clone().resolve(&config.name);
        Self {
            config,
            provider,
            verifier,
            logger,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    async fn run(&self, request: &AuthRequest) -> Outcome<V::User> {
        if let Some(error) = request.query_param("error").filter(|e| !e.is_empty()) {
            let failure = ProviderFailure {
                description: request.query_param("error_description"),
                error,
            };
            self.logger.warn(&format!(
                "Identity provider returned an error: {}",
                failure.error
            ));
            self.record_failure(ocsf::SEVERITY_MEDIUM, None, "Identity provider error in request");
            return Outcome::Fail(Some(failure));
        }

        let Some(token) = request.cookie(&self.config.cookie_name) else {
            self.logger.debug(&format!(
                "No {} cookie on request",
                self.config.cookie_name
            ));
            return self.handle_invalid_token(request);
        };

        let validity = match self.bounded(self.provider.is_token_valid(&token)).await {
            Ok(validity) => validity,
            Err(e) => {
                return self.error(AuthError::provider("Failed to validate session token.", e));
            }
        };
        if let Some(e) = &validity.error {
            self.logger
                .warn(&format!("Token validation reported an error: {e}"));
        }
        if !validity.valid {
            self.logger.debug("Session token rejected by identity provider");
            return self.handle_invalid_token(request);
        }

        let identity = match self.config.load_mode {
            LoadMode::Nothing => Identity::Empty,
            LoadMode::Profile => match self.load_profile(&token).await {
                Ok(profile) => Identity::Profile(profile),
                Err(e) => return self.error(e),
            },
            LoadMode::Attributes => match self.load_attributes(&token).await {
                Ok(resolved) => Identity::Attributes(resolved),
                Err(e) => return self.error(e),
            },
        };

        self.verify(identity).await
    }

    /// Missing or rejected token: redirect to login or fail.
    fn handle_invalid_token(&self, request: &AuthRequest) -> Outcome<V::User> {
        if !self.config.enable_login_redirect {
            self.record_failure(ocsf::SEVERITY_LOW, None, "No valid session token");
            return Outcome::Fail(None);
        }

        let goto = request.return_url(self.config.callback_url.as_deref());
        let location = self.provider.login_ui_url(&goto);
        self.logger
            .debug(&format!("Redirecting to login page: {location}"));
        self.record_failure(
            ocsf::SEVERITY_INFORMATIONAL,
            None,
            "No valid session token, redirecting to login",
        );
        Outcome::Redirect(location)
    }

    async fn load_profile(&self, token: &str) -> Result<NormalizedProfile, AuthError> {
        let raw = self
            .bounded(self.provider.get_attributes(token))
            .await
            .and_then(|r| r)
            .map_err(|e| AuthError::provider("Failed to retrieve user attributes.", e))?;
        Ok(NormalizedProfile::from_attributes(raw))
    }

    async fn load_attributes(&self, token: &str) -> Result<ResolvedIdentity, AuthError> {
        let attributes = self
            .bounded(self.provider.get_attributes(token))
            .await
            .and_then(|r| r)
            .map_err(|e| AuthError::provider("Failed to retrieve user attributes.", e))?;

        let roles = match self
            .bounded(self.provider.get_roles(token))
            .await
            .and_then(|r| r)
        {
            Ok(roles) => roles,
            Err(e) => {
                self.logger
                    .warn(&format!("Roles not retrieved, continuing without groups: {e}"));
                None
            }
        };

        let resolved = ResolvedIdentity::new(attributes, roles.as_deref());
        self.logger.trace(&format!(
            "Resolved {} attributes and groups {:?}",
            resolved.attributes.len(),
            resolved.groups
        ));
        Ok(resolved)
    }

    async fn verify(&self, identity: Identity) -> Outcome<V::User> {
        let email = identity.email().map(String::from);
        match self.verifier.verify(identity).await {
            Ok(user) => {
                self.logger.info("Authentication succeeded");
                ocsf::authentication_event(
                    &self.config.name,
                    ocsf::STATUS_SUCCESS,
                    ocsf::SEVERITY_INFORMATIONAL,
                    email.as_deref(),
                    "Session token accepted",
                );
                Outcome::Success(user)
            }
            Err(e) => self.error(AuthError::verify("Verify callback failed.", e)),
        }
    }

    fn error(&self, err: AuthError) -> Outcome<V::User> {
        self.logger.error(&err.to_string());
        self.record_failure(ocsf::SEVERITY_HIGH, None, &err.to_string());
        Outcome::Error(err)
    }

    fn record_failure(&self, severity: u32, email: Option<&str>, message: &str) {
        ocsf::authentication_event(
            &self.config.name,
            ocsf::STATUS_FAILURE,
            severity,
            email,
            message,
        );
    }

    /// Bound a provider call by the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = T>) -> Result<T, ProviderError> {
        let limit = self.config.provider_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ProviderError::Timeout(limit))
    }
}

#[async_trait]
impl<P, V> Strategy for OpenAmStrategy<P, V>
where
    P: IdentityProvider,
    V: Verifier,
{
    type User = V::User;

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn authenticate(&self, request: &AuthRequest) -> Outcome<V::User> {
        self.run(request).await
    }
}
