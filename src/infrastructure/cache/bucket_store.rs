//! In-memory rate limit bucket store.
//!
//! One fixed-window [`Bucket`] per key in a sharded `DashMap`. The
//! read-modify-write of a bucket happens under its shard's write lock, so
//! concurrent evaluations of the same key behave as if serialized.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::config::RateLimitSettings;
use crate::domain::value_objects::{Bucket, RateLimitDecision, RateLimitPolicy};
use crate::shared::clock::Clock;

/// Default number of windows an expired bucket is kept around.
pub const DEFAULT_GRACE_WINDOWS: u32 = 2;

/// Default number of evaluations between inline sweeps.
pub const DEFAULT_SWEEP_EVERY: u64 = 1000;

/// Fixed-window rate limiter over an in-memory bucket table.
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    default_policy: RateLimitPolicy,
    grace_windows: u32,
    sweep_every: u64,
    evaluations: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter whose windows are measured on `clock`.
    pub fn with_clock(default_policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            default_policy,
            grace_windows: DEFAULT_GRACE_WINDOWS,
            sweep_every: DEFAULT_SWEEP_EVERY,
            evaluations: AtomicU64::new(0),
            clock,
        }
    }

    /// Create from application settings.
    pub fn from_settings(settings: &RateLimitSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(settings.default.policy(), clock)
            .with_grace_windows(settings.grace_windows)
            .with_sweep_every(settings.sweep_every)
    }

    pub fn with_grace_windows(mut self, grace_windows: u32) -> Self {
        self.grace_windows = grace_windows;
        self
    }

    /// Sweep inline every `n` evaluations; zero disables inline sweeps.
    pub fn with_sweep_every(mut self, n: u64) -> Self {
        self.sweep_every = n;
        self
    }

    /// Current time on the limiter's clock, in Unix milliseconds.
    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Evaluate one request for `key` under the default policy.
    pub fn evaluate(&self, key: &str) -> RateLimitDecision {
        self.evaluate_with(key, &self.default_policy)
    }

    /// Evaluate one request for `key`, creating its bucket from `policy` on
    /// first sight. Admitted requests are charged immediately and never
    /// refunded.
    pub fn evaluate_with(&self, key: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        let now = self.clock.now_millis();

        // The shard guard must be released before any sweep takes all shards.
        let decision = match self.buckets.get_mut(key) {
            Some(mut bucket) => {
                let admitted = bucket.charge(now);
                bucket.decision(key, admitted)
            }
            None => {
                let mut bucket = self
                    .buckets
                    .entry(key.to_string())
                    .or_insert_with(|| Bucket::new(policy, now));
                let admitted = bucket.charge(now);
                bucket.decision(key, admitted)
            }
        };

        let count = self.evaluations.fetch_add(1, Ordering::Relaxed) + 1;
        if self.sweep_every > 0 && count % self.sweep_every == 0 {
            self.sweep();
        }

        decision
    }

    /// Remove buckets whose window ended more than the grace period ago.
    /// Returns how many were removed.
    #[instrument(skip(self), fields(tracked = self.buckets.len()))]
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let grace_windows = self.grace_windows;
        let mut removed = 0;
        self.buckets.retain(|_, bucket| {
            let stale = bucket.is_stale(now, grace_windows);
            if stale {
                removed += 1;
            }
            !stale
        });
        if removed > 0 {
            debug!(removed, remaining = self.buckets.len(), "Evicted idle rate limit buckets");
        }
        removed
    }

    /// Number of tracked buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sweep on a fixed interval until the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let limiter = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.upgrade() {
                    Some(limiter) => {
                        limiter.sweep();
                    }
                    None => break,
                }
            }
        })
    }
}
