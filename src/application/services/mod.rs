//! Application Services
//!
//! Business logic layer between HTTP handlers and the domain.

mod fingerprint_service;

pub use fingerprint_service::FingerprintService;
