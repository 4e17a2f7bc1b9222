//! Rate Limiting Middleware
//!
//! Fixed-window rate limiting per client identity and route group. The
//! decision for a request is recorded in its [`RequestContext`]; the
//! response pipeline turns it into `X-RateLimit-*` headers.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::{PolicySettings, RateLimitSettings};
use crate::domain::value_objects::{RateLimitDecision, RateLimitPolicy};
use crate::infrastructure::cache::keys;
use crate::infrastructure::metrics;
use crate::presentation::middleware::context::RequestContext;
use crate::shared::error::AppError;
use crate::startup::AppState;

// ============================================================================
// Route Groups
// ============================================================================

/// Route classes with their own limits and, by default, their own buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// Authentication and fingerprinting endpoints
    Auth,
    /// Resource endpoints (users, guilds, channels)
    Api,
}

impl RouteGroup {
    /// Policy configured for this group, if any. Groups without one share
    /// the limiter's default policy.
    pub fn policy(&self, settings: &RateLimitSettings) -> Option<RateLimitPolicy> {
        let group = match self {
            RouteGroup::Auth => settings.auth.as_ref(),
            RouteGroup::Api => settings.api.as_ref(),
        };
        group.map(PolicySettings::policy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteGroup::Auth => "auth",
            RouteGroup::Api => "api",
        }
    }
}

// ============================================================================
// Identifier Extraction
// ============================================================================

/// Authenticated subject, inserted into request extensions by the
/// authentication layer in front of these routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubject(pub String);

/// Derives the client identity a bucket key is built from.
pub trait KeyExtractor: Send + Sync {
    fn identity(&self, request: &Request) -> String;
}

/// Default identity strategy.
///
/// Priority:
/// 1. Authenticated subject
/// 2. X-Forwarded-For / X-Real-IP, only when proxies are trusted
/// 3. Connection peer address
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientKeyExtractor {
    pub trust_proxy: bool,
}

impl ClientKeyExtractor {
    pub fn new(trust_proxy: bool) -> Self {
        Self { trust_proxy }
    }

    fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
        // First address in the chain is the original client.
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|ip| ip.trim().parse().ok());

        forwarded.or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(|ip| ip.trim().parse().ok())
        })
    }
}

impl KeyExtractor for ClientKeyExtractor {
    fn identity(&self, request: &Request) -> String {
        if let Some(AuthSubject(subject)) = request.extensions().get::<AuthSubject>() {
            return keys::user(subject);
        }

        if self.trust_proxy {
            if let Some(ip) = Self::forwarded_ip(request.headers()) {
                return keys::ip(ip);
            }
        }

        match request.extensions().get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => keys::ip(addr.ip()),
            None => {
                tracing::warn!("Could not determine client identifier for rate limiting");
                keys::ip("unknown")
            }
        }
    }
}

/// Bucket key for `identity` within `group`. The key is always a valid
/// header value, whatever the extractor returned.
pub fn bucket_key(group: RouteGroup, identity: &str, scope_by_group: bool) -> String {
    if scope_by_group {
        keys::scoped(group.as_str(), identity)
    } else {
        keys::header_safe(identity)
    }
}

// ============================================================================
// Middleware Functions
// ============================================================================

/// Rate limiting middleware for authentication endpoints.
pub async fn rate_limit_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, RouteGroup::Auth).await
}

/// Rate limiting middleware for resource endpoints.
pub async fn rate_limit_api(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit_inner(state, request, next, RouteGroup::Api).await
}

/// Internal rate limiting implementation.
async fn rate_limit_inner(
    state: AppState,
    mut request: Request,
    next: Next,
    group: RouteGroup,
) -> Response {
    let settings = &state.settings.rate_limit;
    if !settings.enabled {
        return next.run(request).await;
    }

    let context = match request.extensions().get::<RequestContext>() {
        Some(context) => context.clone(),
        None => {
            tracing::warn!("Rate limit layer installed without the response pipeline");
            let context = RequestContext::new();
            request.extensions_mut().insert(context.clone());
            context
        }
    };

    // An outer limiter already charged this request.
    if let Some(previous) = context.rate_limit() {
        tracing::debug!(bucket = %previous.bucket, group = group.as_str(), "Request already rate limited");
        return next.run(request).await;
    }

    let identity = state.key_extractor.identity(&request);
    let key = bucket_key(group, &identity, settings.scope_by_group);
    let decision = match group.policy(settings) {
        Some(policy) => state.rate_limiter.evaluate_with(&key, &policy),
        None => state.rate_limiter.evaluate(&key),
    };

    metrics::record_rate_limit_decision(group.as_str(), decision.admitted, state.rate_limiter.len());

    let admitted = decision.admitted;
    let retry_after = decision.reset_after_secs(state.rate_limiter.now_millis());
    if context.record_rate_limit(decision).is_err() {
        tracing::error!(bucket = %key, "Rate limit decision recorded twice for one request");
    }

    if admitted {
        next.run(request).await
    } else {
        tracing::warn!(
            bucket = %key,
            group = group.as_str(),
            retry_after,
            "Rate limit exceeded"
        );
        AppError::RateLimited { retry_after }.into_response()
    }
}

// ============================================================================
// Response Headers
// ============================================================================

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
pub const X_RATELIMIT_RESET_AFTER: HeaderName = HeaderName::from_static("x-ratelimit-reset-after");
pub const X_RATELIMIT_BUCKET: HeaderName = HeaderName::from_static("x-ratelimit-bucket");

/// Add rate limit headers to a response.
///
/// `Reset` is absolute Unix seconds and `Reset-After` is relative seconds,
/// both with millisecond precision.
pub fn add_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision, now_millis: u64) {
    let values = [
        (X_RATELIMIT_LIMIT, decision.limit.to_string()),
        (X_RATELIMIT_REMAINING, decision.remaining.min(decision.limit).to_string()),
        (X_RATELIMIT_RESET, format!("{:.3}", decision.reset_at_secs())),
        (
            X_RATELIMIT_RESET_AFTER,
            format!("{:.3}", decision.reset_after_secs(now_millis)),
        ),
        (X_RATELIMIT_BUCKET, decision.bucket.clone()),
    ];

    for (name, value) in values {
        match HeaderValue::from_str(&value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(_) => tracing::warn!(header = %name, "Rate limit header value is not valid ASCII"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
