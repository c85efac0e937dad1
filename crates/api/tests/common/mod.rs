#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use keyward_api::config::ServerConfig;
use keyward_api::router::build_app_router;
use keyward_api::state::AppState;
use keyward_core::token::TokenConfig;
use keyward_db::{AuthStore, MemoryAuthStore};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        token: TokenConfig {
            secret: TEST_SECRET.to_string(),
            access_token_duration: Duration::minutes(15),
            refresh_token_duration: Duration::hours(24),
        },
    }
}

/// Build the full application router over the given store.
pub fn build_test_app_with(store: Arc<dyn AuthStore>) -> Router {
    let config = test_config();
    let state = AppState::new(config.clone(), store).expect("test state should build");
    build_app_router(state, &config)
}

/// Build the full application router over a fresh in-memory store.
///
/// The store is returned too, so tests can seed or inspect it directly.
pub fn build_test_app() -> (Router, Arc<MemoryAuthStore>) {
    let store = Arc::new(MemoryAuthStore::new());
    (build_test_app_with(store.clone()), store)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(uri, &body, None)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request(uri, &body, Some(token))).await
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).expect("valid request")).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("valid request");
    send(app, request).await
}
