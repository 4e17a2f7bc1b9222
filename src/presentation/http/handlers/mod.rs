//! HTTP Handlers
//!
//! Request handlers for the endpoints owned by this layer.

pub mod auth;
pub mod fallback;
pub mod health;
