//! Strategy and application configuration.
//!
//! `StrategyOptions` is what callers hand in (deserialisable, every field
//! optional). `StrategyConfig::sanitize` fills defaults, validates, and
//! produces the immutable config a strategy keeps for its lifetime.

use serde::{Deserialize, Deserializer};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::logger::{LogLevel, LoggerConfig, StrategyLogger};

/// Name under which a strategy registers when none is configured.
pub const STRATEGY_NAME: &str = "openam";
pub const DEFAULT_REALM: &str = "/";
pub const DEFAULT_COOKIE_NAME: &str = "iPlanetDirectoryPro";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw strategy options, keyed the same way as the JSON configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyOptions {
    pub open_am_base_url: Option<String>,
    pub open_am_realm: Option<String>,
    pub open_am_cookie_name: Option<String>,
    pub enable_login_redirect: Option<bool>,
    pub enable_user_attributes: Option<bool>,
    pub enable_user_profile: Option<bool>,
    pub callback_url: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_logger")]
    pub logger: Option<LoggerConfig>,
    pub provider_timeout_secs: Option<u64>,
}

fn deserialize_logger<'de, D>(deserializer: D) -> Result<Option<LoggerConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        s.parse::<LogLevel>()
            .map(LoggerConfig::Level)
            .map_err(|bad| serde::de::Error::custom(format!("unknown log level: {bad}")))
    })
    .transpose()
}

impl StrategyOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            open_am_base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn StrategyLogger>) -> Self {
        self.logger = Some(LoggerConfig::Injected(logger));
        self
    }
}

/// What the strategy loads after a token validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Verify with an empty identity.
    Nothing,
    /// Normalised profile from the attribute payload.
    Profile,
    /// Raw attributes plus groups derived from the roles document.
    Attributes,
}

/// Immutable, validated strategy configuration.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub base_url: Url,
    pub realm: String,
    pub cookie_name: String,
    pub enable_login_redirect: bool,
    pub load_mode: LoadMode,
    pub callback_url: Option<String>,
    pub name: String,
    pub logger: LoggerConfig,
    pub provider_timeout: Duration,
}

impl StrategyConfig {
    /// Fill defaults and validate. Fails if the base URL is missing.
    pub fn sanitize(options: StrategyOptions) -> Result<Self, ConfigError> {
        let raw_base = options
            .open_am_base_url
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = Url::parse(raw_base.trim())
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{raw_base}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(raw_base));
        }

        let attributes = options.enable_user_attributes.unwrap_or(false);
        let profile = options.enable_user_profile.unwrap_or(false);
        let load_mode = match (attributes, profile) {
            (true, true) => return Err(ConfigError::ConflictingLoadModes),
            (true, false) => LoadMode::Attributes,
            (false, true) => LoadMode::Profile,
            (false, false) => LoadMode::Nothing,
        };

        Ok(Self {
            base_url,
            realm: options.open_am_realm.unwrap_or_else(|| DEFAULT_REALM.into()),
            cookie_name: options
                .open_am_cookie_name
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.into()),
            enable_login_redirect: options.enable_login_redirect.unwrap_or(false),
            load_mode,
            callback_url: options.callback_url.filter(|s| !s.is_empty()),
            name: options.name.unwrap_or_else(|| STRATEGY_NAME.into()),
            logger: options.logger.unwrap_or_default(),
            provider_timeout: options
                .provider_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
        })
    }
}

/// Demo server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub base_url: String,
    pub realm: Option<String>,
    pub cookie_name: Option<String>,
    pub callback_url: Option<String>,
    pub log_level: LogLevel,
    pub provider_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required: `OPENAM_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_level = match env::var("OPENAM_LOG_LEVEL") {
            Ok(v) => v.parse().map_err(ConfigError::InvalidLogLevel)?,
            Err(_) => LogLevel::Info,
        };
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            base_url: required_env("OPENAM_BASE_URL")?,
            realm: env::var("OPENAM_REALM").ok(),
            cookie_name: env::var("OPENAM_COOKIE_NAME").ok(),
            callback_url: env::var("OPENAM_CALLBACK_URL").ok(),
            log_level,
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT.as_secs()),
        })
    }

    /// Options for a strategy instance; `name` and load mode vary per route.
    pub fn strategy_options(&self, name: &str, load_attributes: bool) -> StrategyOptions {
        StrategyOptions {
            open_am_base_url: Some(self.base_url.clone()),
            open_am_realm: self.realm.clone(),
            open_am_cookie_name: self.cookie_name.clone(),
            enable_login_redirect: Some(true),
            enable_user_attributes: Some(load_attributes),
            enable_user_profile: None,
            callback_url: self.callback_url.clone(),
            name: Some(name.to_string()),
            logger: Some(LoggerConfig::Level(self.log_level)),
            provider_timeout_secs: Some(self.provider_timeout_secs),
        }
    }

    pub fn test_default() -> Self {
        Self {
            port: 3000,
            base_url: "http://openam.test:8080/OpenAM/".into(),
            realm: None,
            cookie_name: None,
            callback_url: None,
            log_level: LogLevel::Debug,
            provider_timeout_secs: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OpenAmStrategy requires an openAmBaseUrl option")]
    MissingBaseUrl,

    #[error("invalid openAmBaseUrl: {0}")]
    InvalidBaseUrl(String),

    #[error("enableUserAttributes and enableUserProfile cannot both be set")]
    ConflictingLoadModes,

    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),

    #[error("failed to build OpenAM client: {0}")]
    Client(String),

    #[error("missing required environment variable: {0}")]
    MissingEnv(String),
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnv(key.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_defaults() {
        let cfg = StrategyConfig::sanitize(StrategyOptions::new("http://localhost:8080/OpenAM/"))
            .unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://localhost:8080/OpenAM/");
        assert_eq!(cfg.realm, "/");
        assert_eq!(cfg.cookie_name, "iPlanetDirectoryPro");
        assert!(!cfg.enable_login_redirect);
        assert_eq!(cfg.load_mode, LoadMode::Nothing);
        assert!(cfg.callback_url.is_none());
        assert_eq!(cfg.name, STRATEGY_NAME);
        assert!(matches!(cfg.logger, LoggerConfig::Level(LogLevel::Error)));
        assert_eq!(cfg.provider_timeout, DEFAULT_PROVIDER_TIMEOUT);
    }

    #[test]
    fn test_sanitize_missing_base_url() {
        let err = StrategyConfig::sanitize(StrategyOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
        assert!(err.to_string().contains("openAmBaseUrl"));
    }

    #[test]
    fn test_sanitize_blank_base_url() {
        let err = StrategyConfig::sanitize(StrategyOptions::new("   ")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn test_sanitize_relative_base_url() {
        let err = StrategyConfig::sanitize(StrategyOptions::new("/OpenAM")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_sanitize_conflicting_modes() {
        let options = StrategyOptions {
            enable_user_attributes: Some(true),
            enable_user_profile: Some(true),
            ..StrategyOptions::new("http://am.example")
        };
        let err = StrategyConfig::sanitize(options).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingLoadModes));
    }

    #[test]
    fn test_deserialize_camel_case_options() {
        let json = r#"{
            "openAmBaseUrl": "https://sso.example.com/OpenAM/",
            "openAmRealm": "/customers",
            "openAmCookieName": "amToken",
            "enableLoginRedirect": true,
            "enableUserAttributes": true,
            "callbackUrl": "/after-login",
            "name": "openam-fetch",
            "logger": "trace",
            "providerTimeoutSecs": 3
        }"#;
        let options: StrategyOptions = serde_json::from_str(json).unwrap();
        let cfg = StrategyConfig::sanitize(options).unwrap();
        assert_eq!(cfg.realm, "/customers");
        assert_eq!(cfg.cookie_name, "amToken");
        assert!(cfg.enable_login_redirect);
        assert_eq!(cfg.load_mode, LoadMode::Attributes);
        assert_eq!(cfg.callback_url.as_deref(), Some("/after-login"));
        assert_eq!(cfg.name, "openam-fetch");
        assert!(matches!(cfg.logger, LoggerConfig::Level(LogLevel::Trace)));
        assert_eq!(cfg.provider_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_deserialize_profile_mode() {
        let json = r#"{"openAmBaseUrl": "http://am", "enableUserProfile": true}"#;
        let options: StrategyOptions = serde_json::from_str(json).unwrap();
        let cfg = StrategyConfig::sanitize(options).unwrap();
        assert_eq!(cfg.load_mode, LoadMode::Profile);
    }

    #[test]
    fn test_deserialize_unknown_log_level() {
        let json = r#"{"openAmBaseUrl": "http://am", "logger": "chatty"}"#;
        let result: Result<StrategyOptions, _> = serde_json::from_str(json);
        assert!(result.unwrap_err().to_string().contains("chatty"));
    }

    #[test]
    fn test_empty_callback_url_is_ignored() {
        let options = StrategyOptions {
            callback_url: Some(String::new()),
            ..StrategyOptions::new("http://am")
        };
        let cfg = StrategyConfig::sanitize(options).unwrap();
        assert!(cfg.callback_url.is_none());
    }

    #[test]
    fn test_app_config_strategy_options() {
        let app = AppConfig::test_default();
        let options = app.strategy_options("openam-fetch", true);
        let cfg = StrategyConfig::sanitize(options).unwrap();
        assert_eq!(cfg.name, "openam-fetch");
        assert!(cfg.enable_login_redirect);
        assert_eq!(cfg.load_mode, LoadMode::Attributes);
        assert_eq!(cfg.provider_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env_missing_required() {
        // SAFETY: test-only mutation of the process environment.
        unsafe { env::remove_var("OPENAM_BASE_URL") };
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("OPENAM_BASE_URL"));
    }
}
