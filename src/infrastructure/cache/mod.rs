//! Cache Module
//!
//! In-process state shared by every request: the rate limit bucket table.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+
//! | rate limit layer  |  <-- derives the bucket key
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! |   RateLimiter     |  <-- fixed-window accounting, eviction
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! |  DashMap shards   |  <-- per-shard write locks
//! +-------------------+
//! ```

mod bucket_store;

pub use bucket_store::{RateLimiter, DEFAULT_GRACE_WINDOWS, DEFAULT_SWEEP_EVERY};

/// Bucket key prefixes for the built-in identity kinds.
///
/// Keys are echoed back in `X-RateLimit-Bucket`, so every key built here is
/// visible ASCII.
pub mod keys {
    use std::fmt::Write;

    /// Authenticated subject (e.g., "user:175928847299117063")
    pub const USER: &str = "user:";

    /// Network origin (e.g., "ip:203.0.113.9")
    pub const IP: &str = "ip:";

    /// Generates a subject identity. The subject is percent-encoded, `%`
    /// included, so distinct subjects never share a key.
    #[inline]
    pub fn user(subject: impl std::fmt::Display) -> String {
        let mut key = String::from(USER);
        percent_encode(&subject.to_string(), &mut key, true);
        key
    }

    /// Generates a network identity
    #[inline]
    pub fn ip(addr: impl std::fmt::Display) -> String {
        format!("{}{}", IP, addr)
    }

    /// Scopes an identity to a route group (e.g., "auth:ip:203.0.113.9")
    #[inline]
    pub fn scoped(group: &str, identity: &str) -> String {
        let mut key = format!("{}:", group);
        percent_encode(identity, &mut key, false);
        key
    }

    /// Percent-encode bytes outside visible ASCII in an identity produced by
    /// an arbitrary key extractor. Already visible identities are unchanged.
    pub fn header_safe(identity: &str) -> String {
        let mut key = String::with_capacity(identity.len());
        percent_encode(identity, &mut key, false);
        key
    }

    fn percent_encode(raw: &str, out: &mut String, escape_percent: bool) {
        for byte in raw.bytes() {
            let visible = (0x21..=0x7E).contains(&byte);
            if visible && !(escape_percent && byte == b'%') {
                out.push(byte as char);
            } else {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }

}
