//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Snowflake**: Discord-style unique ID with embedded timestamp
//! - **Fingerprint**: snowflake plus random token for anonymous clients
//! - **Rate limit**: fixed-window buckets, policies and decisions

mod fingerprint;
mod rate_limit;
mod snowflake;

pub use fingerprint::*;
pub use rate_limit::*;
pub use snowflake::*;
