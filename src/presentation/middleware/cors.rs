//! CORS Middleware Configuration

use axum::http::HeaderName;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;
use crate::presentation::middleware::rate_limit::{
    X_RATELIMIT_BUCKET, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
    X_RATELIMIT_RESET_AFTER,
};

/// Response headers browsers may read from cross-origin responses.
fn exposed_headers() -> [HeaderName; 5] {
    [
        X_RATELIMIT_LIMIT,
        X_RATELIMIT_REMAINING,
        X_RATELIMIT_RESET,
        X_RATELIMIT_RESET_AFTER,
        X_RATELIMIT_BUCKET,
    ]
}

/// Create CORS layer from settings
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<_> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(exposed_headers());

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(origins)
            .max_age(std::time::Duration::from_secs(3600)) // 1 hour default
    }
}
