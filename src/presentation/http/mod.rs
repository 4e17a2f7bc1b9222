//! HTTP Layer
//!
//! Routes, handlers and extractors.

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::{Payload, SnowflakePath};
pub use routes::create_router;
