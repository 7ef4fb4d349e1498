//! Integration tests for the plain HTTP routes.

mod helpers;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use wolverine_api::{AppState, build_app};

async fn get(path: &str, state: AppState) -> (StatusCode, Value) {
    let response = build_app(state)
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_banner() {
    let (status, body) = get("/", AppState::new(helpers::test_config())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Backend is working now!");
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/api/health", AppState::new(helpers::test_config())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["onlineUsers"], 0);
    assert_eq!(body["connections"], 0);
    assert_eq!(body["metrics"]["connectionsOpened"], 0);
}

#[tokio::test]
async fn test_health_counts_live_connections() {
    let server = helpers::TestServer::spawn().await;
    let _a = server.connect("u1").await;
    let _b = server.connect("u2").await;

    let (status, body) = get("/api/health", server.state.clone()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["onlineUsers"], 2);
    assert_eq!(body["connections"], 2);
}

#[tokio::test]
async fn test_ws_route_requires_token_before_upgrade() {
    let (status, body) = get("/ws", AppState::new(helpers::test_config())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get("/api/products", AppState::new(helpers::test_config())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
