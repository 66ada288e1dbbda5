//! Shared helpers for api tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::util::ServiceExt;

use super::*;

/// Router backed by the bundled diabetes-screening artifacts
pub fn create_test_app() -> Router {
    let state = AppState::demo().expect("test");
    create_router(state)
}

/// Router with neither artifact loaded
pub fn create_unavailable_app() -> Router {
    create_router(AppState::new(Artifacts::unavailable("not found")))
}

/// Send a request and return status plus parsed JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("test");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("test");
    let json = serde_json::from_slice(&body).expect("test");
    (status, json)
}

/// POST a raw body to `/predict`
pub async fn post_predict(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("test");
    send(app, request).await
}

/// GET a path
pub async fn get_path(app: Router, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("test");
    send(app, request).await
}
