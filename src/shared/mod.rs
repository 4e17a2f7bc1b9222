//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod clock;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod snowflake;
