//! Fingerprint API Tests

use std::collections::HashSet;

use axum::http::StatusCode;

use crate::common::{header, json_body, per_minute, TestApp, START_MILLIS};
use api_edge::domain::value_objects::{Fingerprint, Snowflake};

#[tokio::test]
async fn test_fingerprint_has_id_and_token() {
    let app = TestApp::new();

    let response = app.get("/auth/fingerprint").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), Some("application/json"));

    let body = json_body(response).await;
    let raw = body["fingerprint"].as_str().unwrap();
    let (id, token) = raw.split_once('.').unwrap();

    let id: Snowflake = id.parse().unwrap();
    assert_eq!(id.timestamp(), START_MILLIS);
    assert!(token.len() >= 16);
    assert!(raw.parse::<Fingerprint>().is_ok());
}

#[tokio::test]
async fn test_fingerprints_are_distinct() {
    let mut settings = api_edge::config::Settings::default();
    settings.rate_limit.auth = Some(per_minute(50));
    let app = TestApp::with_settings(settings);

    let mut seen = HashSet::new();
    for _ in 0..20 {
        let body = json_body(app.get("/auth/fingerprint").await).await;
        let raw = body["fingerprint"].as_str().unwrap().to_string();
        let (id, token) = raw.split_once('.').unwrap();
        assert!(seen.insert(id.to_string()), "duplicate id {}", id);
        assert!(seen.insert(token.to_string()), "duplicate token {}", token);
    }
}

#[tokio::test]
async fn test_fingerprint_only_accepts_get() {
    let app = TestApp::new();

    let response = app.post("/auth/fingerprint", "{}").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
