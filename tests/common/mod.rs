#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use gemini_relay::service::retry::RetryPolicy;
use gemini_relay::{GeminiClient, RelayState, relay_router};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer};

pub const MODEL: &str = "gemini-test";
pub const KEY: &str = "test-key";
pub const BODY_LIMIT: usize = 1024 * 1024;

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(50))
}

pub fn app(server: &MockServer) -> Router {
    app_with_retry(server, fast_retry())
}

pub fn app_with_retry(server: &MockServer, retry: RetryPolicy) -> Router {
    let client = GeminiClient::new(
        reqwest::Client::new(),
        Url::parse(&server.uri()).expect("mock server uri"),
        MODEL,
        KEY,
    );
    relay_router(RelayState::new(Some(Arc::new(client)), retry, BODY_LIMIT))
}

pub fn app_without_key() -> Router {
    relay_router(RelayState::new(None, fast_retry(), BODY_LIMIT))
}

/// Matches the `generateContent` call with the server key attached.
pub fn generate_content() -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(query_param("key", KEY))
}

pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, json)
}
