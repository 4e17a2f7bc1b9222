//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_edge::config::{PolicySettings, Settings};
use api_edge::presentation::http::{create_router, Payload, SnowflakePath};
use api_edge::presentation::middleware::AuthSubject;
use api_edge::shared::clock::ManualClock;
use api_edge::shared::envelope::ApiResponse;
use api_edge::shared::error::AppError;
use api_edge::startup::AppState;

/// 2023-11-14T22:13:20Z
pub const START_MILLIS: u64 = 1_700_000_000_000;

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Application with default settings and a frozen clock
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Application with the given settings and a frozen clock
    pub fn with_settings(settings: Settings) -> Self {
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let state = AppState::with_clock(settings, clock.clone());
        let router = create_router(state.clone(), resource_routes());
        Self { router, state, clock }
    }

    /// Application whose auth and api groups admit `auth` and `api` requests per minute
    pub fn with_limits(auth: u32, api: u32) -> Self {
        let mut settings = Settings::default();
        settings.rate_limit.auth = Some(per_minute(auth));
        settings.rate_limit.api = Some(per_minute(api));
        Self::with_settings(settings)
    }

    /// Send a request from `peer`
    pub async fn send_from(&self, peer: [u8; 4], mut request: Request<Body>) -> Response {
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 40_000))));
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Make a GET request from the default peer
    pub async fn get(&self, uri: &str) -> Response {
        self.send_from(DEFAULT_PEER, get_request(uri)).await
    }

    /// Make a POST request with a raw body from the default peer
    pub async fn post(&self, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_from(DEFAULT_PEER, request).await
    }

    /// Make a GET request as an authenticated subject
    pub async fn get_as(&self, subject: &str, uri: &str) -> Response {
        let mut request = get_request(uri);
        request.extensions_mut().insert(AuthSubject(subject.to_string()));
        self.send_from(DEFAULT_PEER, request).await
    }
}

/// Group policy admitting `limit` requests per minute
pub fn per_minute(limit: u32) -> PolicySettings {
    PolicySettings {
        limit,
        window_secs: 60,
    }
}

pub const DEFAULT_PEER: [u8; 4] = [192, 0, 2, 10];

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Collect a response body as JSON
pub async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a header as a string
pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// ============================================================================
// Resource routes mounted in tests
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateGuild {
    name: String,
}

fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/guilds", axum::routing::post(create_guild))
        .route("/guilds/{guild_id}", get(get_guild))
        .route("/boom", get(boom))
        .route("/fail", get(fail))
}

async fn get_guild(SnowflakePath(id): SnowflakePath) -> Result<ApiResponse<Value>, AppError> {
    if id.as_i64() == 0 {
        return Err(AppError::application(10004, "Unknown Guild", StatusCode::NOT_FOUND));
    }
    Ok(ApiResponse::ok(json!({ "id": id.to_string() })))
}

async fn create_guild(
    State(state): State<AppState>,
    Payload(body): Payload<CreateGuild>,
) -> Result<ApiResponse<Value>, AppError> {
    let id = state.snowflake.next_id()?;
    Ok(ApiResponse::created(json!({ "id": id.to_string(), "name": body.name })))
}

async fn boom() -> &'static str {
    panic!("handler exploded")
}

async fn fail() -> Result<&'static str, AppError> {
    Err(AppError::internal("database password is hunter2"))
}
