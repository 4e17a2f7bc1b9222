//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::{header, json_body, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_reports_tracked_buckets() {
    let app = TestApp::new();
    assert_eq!(json_body(app.get("/health").await).await["rate_limit_buckets"], 0);

    app.get("/auth/fingerprint").await;
    app.get("/guilds/1").await;

    assert_eq!(json_body(app.get("/health").await).await["rate_limit_buckets"], 2);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = TestApp::new();
    app.get("/auth/fingerprint").await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "content-type")
        .unwrap()
        .starts_with("text/plain"));
}
