//! Test utilities: wiremock OpenAM server, test app builder, request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use openam_strategy::config::AppConfig;
use openam_strategy::profile::Identity;
use openam_strategy::registry::StrategyRegistry;
use openam_strategy::{AppState, build_registry, create_app};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "AQIC5wM2LY4SfczEBjWqRzsuVKMJH7Q";

pub const ADMIN_ATTRIBUTES: &str = "userdetails.token.id=AQIC5wM2LY4SfczEBjWqRzsuVKMJH7Q\n\
userdetails.attribute.name=uid\n\
userdetails.attribute.value=demo\n\
userdetails.attribute.name=mail\n\
userdetails.attribute.value=demo@example.com\n\
userdetails.role=id=admin,ou=group,dc=openam,dc=example,dc=com\n\
userdetails.role=id=editors,ou=group,dc=openam,dc=example,dc=com\n";

pub const VIEWER_ATTRIBUTES: &str = "userdetails.token.id=AQIC5wM2LY4SfczEBjWqRzsuVKMJH7Q\n\
userdetails.attribute.name=uid\n\
userdetails.attribute.value=viewer\n\
userdetails.role=id=viewer,ou=group,dc=openam,dc=example,dc=com\n";

/// Start a mock OpenAM that accepts only [`TOKEN`].
pub async fn mock_openam() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/OpenAM/identity/isTokenValid"))
        .and(body_string_contains(format!("tokenid={TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("boolean=true\n"))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/OpenAM/identity/isTokenValid"))
        .respond_with(ResponseTemplate::new(200).set_body_string("boolean=false\n"))
        .with_priority(10)
        .mount(&server)
        .await;

    server
}

/// Answer attribute lookups with `body`.
pub async fn mount_attributes(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/OpenAM/identity/attributes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Answer attribute lookups with an error status.
pub async fn mount_attributes_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path("/OpenAM/identity/attributes"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        base_url: format!("{}/OpenAM/", server.uri()),
        ..AppConfig::test_default()
    }
}

/// Build the demo app against the mock OpenAM.
pub fn build_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    let config = test_config(server);
    let registry = build_registry(&config).expect("valid test config");
    build_test_app_with_registry(registry)
}

/// Build the demo app with a caller-supplied registry.
pub fn build_test_app_with_registry(
    registry: StrategyRegistry<Identity>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        registry: Arc::new(registry),
    });
    let app = create_app(state.clone());
    (app, state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Host", "app.example.com")
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Host", "app.example.com")
        .header("Cookie", format!("theme=dark; iPlanetDirectoryPro={token}"))
        .body(Body::empty())
        .unwrap()
}
