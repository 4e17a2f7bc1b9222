//! Rate Limit API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{get_request, header, json_body, per_minute, TestApp, DEFAULT_PEER};

/// All five headers present, `Remaining <= Limit` and `Reset-After >= 0`.
fn assert_rate_limit_headers(response: &axum::response::Response, expected_limit: u32) {
    let limit: u32 = header(response, "x-ratelimit-limit").unwrap().parse().unwrap();
    let remaining: u32 = header(response, "x-ratelimit-remaining").unwrap().parse().unwrap();
    let reset: f64 = header(response, "x-ratelimit-reset").unwrap().parse().unwrap();
    let reset_after: f64 = header(response, "x-ratelimit-reset-after").unwrap().parse().unwrap();

    assert_eq!(limit, expected_limit);
    assert!(remaining <= limit);
    assert!(reset > 0.0);
    assert!(reset_after >= 0.0);
    assert!(!header(response, "x-ratelimit-bucket").unwrap().is_empty());
}

#[tokio::test]
async fn test_limit_then_reject() {
    let app = TestApp::with_limits(3, 60);

    for expected_remaining in ["2", "1", "0"] {
        let response = app.get("/auth/fingerprint").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-ratelimit-remaining"), Some(expected_remaining));
    }

    let response = app.get("/auth/fingerprint").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_rate_limit_headers(&response, 3);
    assert_eq!(header(&response, "x-ratelimit-remaining"), Some("0"));
    assert_eq!(
        header(&response, "x-ratelimit-bucket"),
        Some("auth:ip:192.0.2.10")
    );

    let body = json_body(response).await;
    let retry_after = body["retry_after"].as_f64().unwrap();
    assert!(retry_after >= 0.0);
    assert!(retry_after <= 60.0);
    assert_eq!(body["message"], "429: Too Many Requests");
}

#[tokio::test]
async fn test_headers_on_every_decision() {
    let app = TestApp::with_limits(5, 60);
    let response = app.get("/auth/fingerprint").await;

    let limit: u32 = header(&response, "x-ratelimit-limit").unwrap().parse().unwrap();
    let remaining: u32 = header(&response, "x-ratelimit-remaining").unwrap().parse().unwrap();
    let reset: f64 = header(&response, "x-ratelimit-reset").unwrap().parse().unwrap();
    let reset_after: f64 = header(&response, "x-ratelimit-reset-after").unwrap().parse().unwrap();

    assert_eq!(limit, 5);
    assert!(remaining <= limit);
    assert!(reset_after >= 0.0);
    assert_eq!(reset_after, 60.0);
    assert_eq!(reset, 1_700_000_060.0);
    assert_eq!(
        header(&response, "x-ratelimit-bucket"),
        Some("auth:ip:192.0.2.10")
    );
}

#[tokio::test]
async fn test_window_rollover() {
    let app = TestApp::with_limits(2, 60);
    app.get("/auth/fingerprint").await;
    app.get("/auth/fingerprint").await;
    let first_reset = header(&app.get("/auth/fingerprint").await, "x-ratelimit-reset")
        .map(str::to_string)
        .unwrap();

    app.clock.advance(60_000);

    let response = app.get("/auth/fingerprint").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-ratelimit-remaining"), Some("1"));

    let first: f64 = first_reset.parse().unwrap();
    let second: f64 = header(&response, "x-ratelimit-reset").unwrap().parse().unwrap();
    assert!(second > first);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_admit_exactly_limit() {
    let app = TestApp::with_limits(5, 10);

    let handles: Vec<_> = (0..30)
        .map(|_| {
            let router = app.router.clone();
            tokio::spawn(async move {
                let mut request = get_request("/guilds/42");
                request.extensions_mut().insert(axum::extract::ConnectInfo(
                    std::net::SocketAddr::from((DEFAULT_PEER, 40_000)),
                ));
                tower::ServiceExt::oneshot(router, request).await.unwrap().status()
            })
        })
        .collect();

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => admitted += 1,
            StatusCode::TOO_MANY_REQUESTS => rejected += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(admitted, 10);
    assert_eq!(rejected, 20);
}

#[tokio::test]
async fn test_groups_and_clients_are_isolated() {
    let app = TestApp::with_limits(1, 60);

    assert_eq!(app.get("/auth/fingerprint").await.status(), StatusCode::OK);
    assert_eq!(
        app.get("/auth/fingerprint").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // Same client, other group
    let response = app.get("/guilds/42").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-ratelimit-bucket"), Some("api:ip:192.0.2.10"));

    // Other client, same group
    let response = app
        .send_from([198, 51, 100, 1], get_request("/auth/fingerprint"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Authenticated subject is keyed apart from its address
    let response = app.get_as("80351110224678912", "/guilds/42").await;
    assert_eq!(
        header(&response, "x-ratelimit-bucket"),
        Some("api:user:80351110224678912")
    );
}

#[tokio::test]
async fn test_health_and_metrics_are_exempt() {
    let app = TestApp::with_limits(1, 1);

    for _ in 0..3 {
        let response = app.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header(&response, "x-ratelimit-limit").is_none());
    }

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "x-ratelimit-bucket").is_none());
}

#[tokio::test]
async fn test_disabled_limiter_sends_no_headers() {
    let mut settings = api_edge::config::Settings::default();
    settings.rate_limit.enabled = false;
    settings.rate_limit.auth = Some(per_minute(1));
    let app = TestApp::with_settings(settings);

    for _ in 0..3 {
        let response = app.get("/auth/fingerprint").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header(&response, "x-ratelimit-limit").is_none());
    }
    assert!(app.state.rate_limiter.is_empty());
}

#[tokio::test]
async fn test_non_ascii_subject_keeps_every_header() {
    let app = TestApp::with_limits(5, 5);

    let response = app.get_as("jöhn", "/guilds/42").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_rate_limit_headers(&response, 5);
    assert_eq!(
        header(&response, "x-ratelimit-bucket"),
        Some("api:user:j%C3%B6hn")
    );

    // Same subject, same bucket
    let response = app.get_as("jöhn", "/guilds/42").await;
    assert_eq!(header(&response, "x-ratelimit-remaining"), Some("3"));
}

#[tokio::test]
async fn test_api_group_falls_back_to_default_policy() {
    let mut settings = api_edge::config::Settings::default();
    settings.rate_limit.default = per_minute(2);
    settings.rate_limit.api = None;
    let app = TestApp::with_settings(settings);

    assert_eq!(app.get("/guilds/42").await.status(), StatusCode::OK);
    assert_eq!(app.get("/guilds/42").await.status(), StatusCode::OK);

    let response = app.get("/guilds/42").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_rate_limit_headers(&response, 2);
    assert_eq!(header(&response, "x-ratelimit-bucket"), Some("api:ip:192.0.2.10"));

    // The auth group keeps its own policy
    let response = app.get("/auth/fingerprint").await;
    assert_eq!(header(&response, "x-ratelimit-limit"), Some("5"));
}
