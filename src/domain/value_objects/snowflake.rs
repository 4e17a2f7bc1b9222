//! Discord-style Snowflake ID implementation.
//!
//! Snowflake IDs are 64-bit integers with embedded timestamp information,
//! allowing for time-sortable, globally unique identifiers without coordination.
//!
//! ## Structure
//!
//! ```text
//! 64                         22          17          12          0
//! +---------------------------+-----------+-----------+-----------+
//! |         timestamp         |  worker   |  process  |  sequence |
//! |          (42 bits)        |  (5 bits) |  (5 bits) |  (12 bits)|
//! +---------------------------+-----------+-----------+-----------+
//! ```
//!
//! The timestamp field holds milliseconds elapsed since a fixed epoch, so
//! comparing two raw values compares their creation times whenever both were
//! minted against the same epoch.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discord epoch: 2015-01-01T00:00:00Z in milliseconds
pub const DISCORD_EPOCH: u64 = 1420070400000;

pub const TIMESTAMP_SHIFT: u32 = 22;
pub const WORKER_SHIFT: u32 = 17;
pub const PROCESS_SHIFT: u32 = 12;

/// Largest worker or process discriminator (5 bits).
pub const MAX_DISCRIMINATOR: u8 = 0x1F;

/// Largest per-millisecond sequence value (12 bits).
pub const MAX_SEQUENCE: u16 = 0xFFF;

/// Largest representable elapsed-milliseconds value (42 bits).
pub const MAX_ELAPSED_MS: u64 = (1 << 42) - 1;

/// A Discord-style Snowflake ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snowflake(pub i64);

impl Snowflake {
    /// Create a new Snowflake from raw value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Create a Snowflake from its components.
    ///
    /// `elapsed_ms` is relative to the generator's epoch, not the Unix epoch.
    pub fn from_parts(elapsed_ms: u64, worker_id: u8, process_id: u8, sequence: u16) -> Self {
        let ts = (elapsed_ms & MAX_ELAPSED_MS) << TIMESTAMP_SHIFT;
        let worker = ((worker_id & MAX_DISCRIMINATOR) as u64) << WORKER_SHIFT;
        let process = ((process_id & MAX_DISCRIMINATOR) as u64) << PROCESS_SHIFT;
        let seq = (sequence & MAX_SEQUENCE) as u64;

        Self((ts | worker | process | seq) as i64)
    }

    /// Milliseconds since `epoch` encoded in this Snowflake.
    pub fn elapsed_ms(&self) -> u64 {
        (self.0 as u64) >> TIMESTAMP_SHIFT
    }

    /// Unix timestamp in milliseconds, assuming the Discord epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp_since(DISCORD_EPOCH)
    }

    /// Unix timestamp in milliseconds for a custom epoch.
    pub fn timestamp_since(&self, epoch: u64) -> u64 {
        self.elapsed_ms() + epoch
    }

    /// Creation time as a DateTime, assuming the Discord epoch.
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp() as i64)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Extract the worker ID from this Snowflake.
    pub fn worker_id(&self) -> u8 {
        ((self.0 as u64 >> WORKER_SHIFT) & MAX_DISCRIMINATOR as u64) as u8
    }

    /// Extract the process ID from this Snowflake.
    pub fn process_id(&self) -> u8 {
        ((self.0 as u64 >> PROCESS_SHIFT) & MAX_DISCRIMINATOR as u64) as u8
    }

    /// Extract the sequence number from this Snowflake.
    pub fn sequence(&self) -> u16 {
        (self.0 as u64 & MAX_SEQUENCE as u64) as u16
    }

    /// Get the raw i64 value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for Snowflake {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Snowflake> for i64 {
    fn from(snowflake: Snowflake) -> Self {
        snowflake.0
    }
}
