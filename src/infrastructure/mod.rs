//! Infrastructure Layer
//!
//! Contains implementations for process-local services:
//! - Rate limit bucket storage
//! - Prometheus metrics

pub mod cache;
pub mod metrics;
