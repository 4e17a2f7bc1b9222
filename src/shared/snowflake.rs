//! Snowflake ID Generator
//!
//! Twitter-style distributed unique ID generation.
//!
//! A generator owns the last timestamp it issued and the sequence counter for
//! that millisecond. Both live behind one mutex, so concurrent callers are
//! serialized and can never observe the same `(timestamp, sequence)` pair.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::SnowflakeSettings;
use crate::domain::value_objects::{
    Snowflake, DISCORD_EPOCH, MAX_DISCRIMINATOR, MAX_ELAPSED_MS, MAX_SEQUENCE,
};
use crate::shared::clock::{Clock, SystemClock};

/// Default tolerance for a clock that steps backwards (NTP slew, VM pause).
pub const DEFAULT_MAX_CLOCK_SKEW_MS: u64 = 5;

/// Upper bound on the tolerance. Waiting out a regression blocks the calling
/// thread with the generator locked, so it must stay short.
pub const MAX_CLOCK_SKEW_LIMIT_MS: u64 = 50;

/// Snowflake generation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeError {
    #[error("clock moved backwards: last id issued at {last}ms, clock reads {now}ms")]
    ClockRegression { last: u64, now: u64 },

    #[error("clock reads {now}ms which is before the generator epoch {epoch}ms")]
    BeforeEpoch { now: u64, epoch: u64 },

    #[error("timestamp {elapsed}ms since epoch no longer fits in 42 bits")]
    TimestampOverflow { elapsed: u64 },
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u16,
}

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    worker_id: u8,
    process_id: u8,
    epoch: u64,
    max_clock_skew_ms: u64,
    clock: Arc<dyn Clock>,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a generator on the system clock with the Discord epoch.
    pub fn new(worker_id: u8, process_id: u8) -> Self {
        Self::with_clock(worker_id, process_id, DISCORD_EPOCH, Arc::new(SystemClock))
    }

    /// Create a generator with an explicit epoch and time source.
    pub fn with_clock(worker_id: u8, process_id: u8, epoch: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            worker_id: worker_id & MAX_DISCRIMINATOR,
            process_id: process_id & MAX_DISCRIMINATOR,
            epoch,
            max_clock_skew_ms: DEFAULT_MAX_CLOCK_SKEW_MS,
            clock,
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Create a generator from application settings.
    pub fn from_settings(settings: &SnowflakeSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(settings.worker_id, settings.process_id, settings.epoch, clock)
            .with_max_clock_skew(settings.max_clock_skew_ms)
    }

    /// Set how far the clock may step backwards before `next_id` fails,
    /// capped at [`MAX_CLOCK_SKEW_LIMIT_MS`].
    pub fn with_max_clock_skew(mut self, millis: u64) -> Self {
        self.max_clock_skew_ms = millis.min(MAX_CLOCK_SKEW_LIMIT_MS);
        self
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn worker_id(&self) -> u8 {
        self.worker_id
    }

    pub fn process_id(&self) -> u8 {
        self.process_id
    }

    /// Generate a new snowflake ID.
    ///
    /// Blocks the calling thread for at most one millisecond when the
    /// sequence is exhausted, or for at most the configured skew when the
    /// clock has stepped backwards. The lock is held while waiting, so other
    /// callers stall for the same time; async callers run this inline on
    /// their worker thread.
    pub fn next_id(&self) -> Result<Snowflake, SnowflakeError> {
        let mut state = self.state.lock();

        let mut now = self.clock.now_millis();
        if now < state.last_timestamp {
            now = self.wait_for_regression(state.last_timestamp, now)?;
        }
        if now < self.epoch {
            return Err(SnowflakeError::BeforeEpoch {
                now,
                epoch: self.epoch,
            });
        }

        if now == state.last_timestamp {
            if state.sequence >= MAX_SEQUENCE {
                now = self.wait_next_millis(state.last_timestamp);
                state.sequence = 0;
            } else {
                state.sequence += 1;
            }
        } else {
            state.sequence = 0;
        }

        let elapsed = now - self.epoch;
        if elapsed > MAX_ELAPSED_MS {
            return Err(SnowflakeError::TimestampOverflow { elapsed });
        }
        state.last_timestamp = now;

        Ok(Snowflake::from_parts(
            elapsed,
            self.worker_id,
            self.process_id,
            state.sequence,
        ))
    }

    /// Spin until the clock passes `last`.
    fn wait_next_millis(&self, last: u64) -> u64 {
        loop {
            let now = self.clock.now_millis();
            if now > last {
                return now;
            }
            std::thread::yield_now();
        }
    }

    /// Sleep out a small backwards step, or fail if it is too large.
    fn wait_for_regression(&self, last: u64, now: u64) -> Result<u64, SnowflakeError> {
        if last - now > self.max_clock_skew_ms {
            tracing::error!(last, now, "Clock regression exceeds tolerance");
            return Err(SnowflakeError::ClockRegression { last, now });
        }

        tracing::warn!(last, now, "Clock moved backwards, waiting for it to catch up");
        // One extra attempt covers rounding at the millisecond boundary.
        for _ in 0..=self.max_clock_skew_ms {
            std::thread::sleep(Duration::from_millis(1));
            let current = self.clock.now_millis();
            if current >= last {
                return Ok(current);
            }
        }

        Err(SnowflakeError::ClockRegression {
            last,
            now: self.clock.now_millis(),
        })
    }
}
