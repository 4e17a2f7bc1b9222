//! Error Response Tests
//!
//! Every failure leaves the server with a taxonomy body, whatever produced it.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

use crate::common::{header, json_body, TestApp};

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&response, "content-type"), Some("application/json"));
    assert_eq!(
        json_body(response).await,
        json!({"code": 0, "message": "404: Not Found"})
    );
}

#[tokio::test]
async fn test_favicon_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/favicon.ico").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "404: Not Found");
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let app = TestApp::new();

    let response = app.post("/health", "").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        json_body(response).await,
        json!({"code": 0, "message": "405: Method Not Allowed"})
    );
}

#[test_case("/guilds/not-a-number" ; "non numeric id")]
#[test_case("/guilds/-5" ; "negative id")]
#[test_case("/guilds/99999999999999999999999" ; "overflowing id")]
#[tokio::test]
async fn test_bad_path_is_malformed(uri: &str) {
    let app = TestApp::new();

    let response = app.get(uri).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await,
        json!({"code": 50035, "message": "403: Malformed Request"})
    );
}

#[test_case("{not json" ; "invalid json")]
#[test_case(r#"{"title":"x"}"# ; "missing field")]
#[test_case("" ; "empty body")]
#[tokio::test]
async fn test_bad_body_is_malformed(body: &str) {
    let app = TestApp::new();

    let response = app.post("/guilds", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], 50035);
}

#[tokio::test]
async fn test_valid_body_is_created() {
    let app = TestApp::new();

    let response = app.post("/guilds", r#"{"name":"Rustaceans"}"#).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["name"], "Rustaceans");
    assert!(body["id"].as_str().unwrap().parse::<i64>().is_ok());
}

#[tokio::test]
async fn test_application_error_keeps_code_and_status() {
    let app = TestApp::new();

    let response = app.get("/guilds/0").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    // Resource routes are still rate limited on failure
    assert!(header(&response, "x-ratelimit-limit").is_some());
    assert_eq!(
        json_body(response).await,
        json!({"code": 10004, "message": "Unknown Guild"})
    );
}

#[tokio::test]
async fn test_panic_is_internal_error() {
    let app = TestApp::new();

    let response = app.get("/boom").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"code": 0, "message": "500: Internal Server Error"})
    );
}

#[tokio::test]
async fn test_internal_error_hides_detail() {
    let app = TestApp::new();

    let response = app.get("/fail").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body, json!({"code": 0, "message": "500: Internal Server Error"}));
    assert!(!body.to_string().contains("hunter2"));
}
