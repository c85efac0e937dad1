//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use keyward_core::types::SessionId;
use keyward_db::models::identity::{CreateIdentity, Identity};
use keyward_db::models::session::{CreateSession, Session};
use keyward_db::{AuthStore, StoreError};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
}

/// Store whose backend is always unreachable.
struct DownStore;

#[async_trait]
impl AuthStore for DownStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn register(
        &self,
        _identity: &CreateIdentity,
        _session: &CreateSession,
    ) -> Result<(Identity, Session), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_identity(&self, _username: &str) -> Result<Option<Identity>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_identity_by_login(&self, _login: &str) -> Result<Option<Identity>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn create_session(&self, _session: &CreateSession) -> Result<Session, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_session(&self, _id: SessionId) -> Result<Option<Session>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn health_check_reports_unreachable_store() {
    let app = common::build_test_app_with(Arc::new(DownStore));
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], false);
}

#[tokio::test]
async fn store_outage_is_a_sanitized_500() {
    let app = common::build_test_app_with(Arc::new(DownStore));
    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "login": "alice", "password": "pw123456" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (app, _) = common::build_test_app();
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let (app, _) = common::build_test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/auth/login")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
}
