//! OpenAM HTTP client over the identity REST endpoints.
//!
//! `POST {base}/identity/isTokenValid` and `POST {base}/identity/attributes`,
//! both form-encoded, both answering in `key=value` text.

use std::time::Duration;
use url::Url;

use super::attributes::{parse_attributes, parse_validity};
use super::{IdentityProvider, ProviderError, TokenValidity};
use crate::config::StrategyConfig;
use crate::profile::{RawAttributes, ROLE_MARKER};

#[derive(Debug, Clone)]
pub struct OpenAmClient {
    http_client: reqwest::Client,
    base_url: String,
    realm: String,
}

impl OpenAmClient {
    pub fn new(base_url: &Url, realm: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self::with_http_client(http_client, base_url, realm))
    }

    pub fn with_http_client(http_client: reqwest::Client, base_url: &Url, realm: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            realm: realm.to_string(),
        }
    }

    /// Client matching a sanitized strategy config.
    pub fn from_config(config: &StrategyConfig) -> Result<Self, ProviderError> {
        Self::new(&config.base_url, &config.realm, config.provider_timeout)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_form(&self, path: &str, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        let resp = self
            .http_client
            .post(self.endpoint(path))
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        // Capture status before consuming the body
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text.trim().to_string(),
            });
        }

        Ok(text)
    }

    async fn attributes_document(&self, token: &str) -> Result<String, ProviderError> {
        self.post_form("identity/attributes", &[("subjectid", token)])
            .await
    }
}

impl IdentityProvider for OpenAmClient {
    async fn is_token_valid(&self, token: &str) -> TokenValidity {
        match self
            .post_form("identity/isTokenValid", &[("tokenid", token)])
            .await
            .and_then(|body| parse_validity(&body))
        {
            Ok(true) => TokenValidity::valid(),
            Ok(false) => TokenValidity::invalid(),
            Err(e) => TokenValidity::invalid_with(e),
        }
    }

    async fn get_attributes(&self, token: &str) -> Result<RawAttributes, ProviderError> {
        let body = self.attributes_document(token).await?;
        Ok(parse_attributes(&body))
    }

    async fn get_roles(&self, token: &str) -> Result<Option<String>, ProviderError> {
        let body = self.attributes_document(token).await?;
        if body.contains(ROLE_MARKER) {
            Ok(Some(body))
        } else {
            Ok(None)
        }
    }

    fn login_ui_url(&self, goto: &str) -> String {
        format!(
            "{}/UI/Login?realm={}&goto={}",
            self.base_url,
            urlencoding::encode(&self.realm),
            urlencoding::encode(goto)
        )
    }
}
