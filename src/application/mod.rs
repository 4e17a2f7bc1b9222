//! Application Layer
//!
//! Services that orchestrate domain values for the HTTP handlers, and the
//! DTOs they return.

pub mod dto;
pub mod services;
