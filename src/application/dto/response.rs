//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::domain::value_objects::Fingerprint;

/// `GET /auth/fingerprint` body
#[derive(Debug, Serialize)]
pub struct FingerprintResponse {
    pub fingerprint: Fingerprint,
}

impl From<Fingerprint> for FingerprintResponse {
    fn from(fingerprint: Fingerprint) -> Self {
        Self { fingerprint }
    }
}
