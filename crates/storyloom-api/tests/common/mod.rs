//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storyloom_test_support::{FixedClock, MockRng, SequenceRng, fixed_now};
use tower::ServiceExt;

use storyloom_api::state::AppState;

/// Build in-memory state with a pinned clock and zeroed random id bits, so
/// ids come out consecutive.
pub fn build_test_state() -> AppState {
    AppState::in_memory(Arc::new(FixedClock(fixed_now())), Box::new(MockRng))
}

/// Build in-memory state whose random id bits come from `rng`. The sequence
/// must cover every id the test generates.
pub fn build_test_state_with_rng(rng: SequenceRng) -> AppState {
    AppState::in_memory(Arc::new(FixedClock(fixed_now())), Box::new(rng))
}

/// Build the full app router over `state`, as `main.rs` does minus layers.
pub fn build_test_app(state: &AppState) -> Router {
    storyloom_api::app(state.clone())
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
