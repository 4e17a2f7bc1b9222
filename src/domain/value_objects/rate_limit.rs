//! Fixed-window rate limit accounting.
//!
//! These types hold no locks and read no clocks; callers pass `now` in Unix
//! milliseconds and are responsible for serializing access per bucket.

use std::time::Duration;

use serde::Serialize;

/// Limit and window length for one route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Requests admitted per window
    pub limit: u32,
    /// Window length
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    /// Window length in milliseconds, never zero.
    pub fn window_ms(&self) -> u64 {
        (self.window.as_millis() as u64).max(1)
    }
}

/// Accounting record for one bucket key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    limit: u32,
    remaining: u32,
    reset_at: u64,
    window_ms: u64,
}

impl Bucket {
    /// Open a fresh window starting at `now`.
    pub fn new(policy: &RateLimitPolicy, now: u64) -> Self {
        let window_ms = policy.window_ms();
        Self {
            limit: policy.limit,
            remaining: policy.limit,
            reset_at: now.saturating_add(window_ms),
            window_ms,
        }
    }

    /// Roll the window over if `now` has reached `reset_at`.
    fn roll(&mut self, now: u64) {
        if now >= self.reset_at {
            self.remaining = self.limit;
            self.reset_at = now.saturating_add(self.window_ms);
        }
    }

    /// Account one request. Returns whether it is admitted.
    pub fn charge(&mut self, now: u64) -> bool {
        self.roll(now);
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Whether the window ended more than `grace_windows` windows ago.
    pub fn is_stale(&self, now: u64, grace_windows: u32) -> bool {
        let grace = self.window_ms.saturating_mul(grace_windows as u64);
        now >= self.reset_at.saturating_add(grace)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Snapshot this bucket into a decision for `key`.
    pub fn decision(&self, key: &str, admitted: bool) -> RateLimitDecision {
        RateLimitDecision {
            admitted,
            limit: self.limit,
            remaining: self.remaining,
            reset_at: self.reset_at,
            bucket: key.to_string(),
        }
    }
}

/// Outcome of evaluating one request against its bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix milliseconds at which the window resets
    pub reset_at: u64,
    /// Bucket key that produced this decision
    pub bucket: String,
}

impl RateLimitDecision {
    /// Milliseconds until reset, clamped at zero.
    pub fn reset_after_ms(&self, now: u64) -> u64 {
        self.reset_at.saturating_sub(now)
    }

    /// Seconds until reset, clamped at zero.
    pub fn reset_after_secs(&self, now: u64) -> f64 {
        self.reset_after_ms(now) as f64 / 1000.0
    }

    /// Absolute reset time in Unix seconds.
    pub fn reset_at_secs(&self) -> f64 {
        self.reset_at as f64 / 1000.0
    }
}
