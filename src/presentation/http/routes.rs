//! Route Configuration
//!
//! Assembles the public router: the fingerprint endpoint, the injected
//! resource routes, health and metrics endpoints, and the middleware every response passes through.

use axum::{
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{handle_panic, rate_limit_api, rate_limit_auth, response_pipeline};
use crate::startup::AppState;

/// Create the main router.
///
/// `resources` carries the resource endpoints; they are mounted as-is and
/// rate limited as the `api` group.
pub fn create_router(state: AppState, resources: Router<AppState>) -> Router {
    Router::new()
        .merge(auth_routes(state.clone()))
        .merge(resources.layer(middleware::from_fn_with_state(state.clone(), rate_limit_api)))
        // Health and metrics are exempt from rate limiting
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(metrics_handler))
        .route("/favicon.ico", get(handlers::fallback::not_found))
        .fallback(handlers::fallback::not_found)
        .method_not_allowed_fallback(handlers::fallback::method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        // Outermost: every response, including rejections, is encoded here
        .layer(middleware::from_fn_with_state(state.clone(), response_pipeline))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Authentication routes (stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/fingerprint", get(handlers::auth::fingerprint))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}
