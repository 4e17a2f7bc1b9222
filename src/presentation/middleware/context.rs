//! Per-request Context
//!
//! Created by the response pipeline for each request and carried in the
//! request extensions. Anything evaluated for this request that must show
//! up on the response (today: the rate limit decision) is recorded here
//! instead of in shared state, so concurrent requests never see each
//! other's values.

use std::sync::{Arc, OnceLock};

use crate::domain::value_objects::RateLimitDecision;

#[derive(Debug, Default)]
struct ContextInner {
    rate_limit: OnceLock<RateLimitDecision>,
}

/// Cheaply cloneable handle to one request's context.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decision recorded for this request, if it was evaluated.
    pub fn rate_limit(&self) -> Option<&RateLimitDecision> {
        self.inner.rate_limit.get()
    }

    /// Record the rate limit decision. A request is evaluated at most once:
    /// a second decision is refused and handed back.
    pub fn record_rate_limit(&self, decision: RateLimitDecision) -> Result<(), RateLimitDecision> {
        self.inner.rate_limit.set(decision)
    }
}
