//! Fingerprint Service
//!
//! Issues anonymous client fingerprints.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::value_objects::Fingerprint;
use crate::infrastructure::metrics;
use crate::shared::snowflake::{SnowflakeError, SnowflakeGenerator};

#[derive(Clone)]
pub struct FingerprintService {
    snowflake: Arc<SnowflakeGenerator>,
}

impl FingerprintService {
    pub fn new(snowflake: Arc<SnowflakeGenerator>) -> Self {
        Self { snowflake }
    }

    /// Mint a fingerprint from a fresh snowflake and a random token.
    #[instrument(skip(self))]
    pub fn issue(&self) -> Result<Fingerprint, SnowflakeError> {
        let id = self.snowflake.next_id()?;
        metrics::record_snowflake();
        tracing::debug!(id = %id, "Issued fingerprint");
        Ok(Fingerprint::new(id))
    }
}
