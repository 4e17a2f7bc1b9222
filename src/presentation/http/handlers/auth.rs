//! Authentication Handlers
//!
//! Only the anonymous fingerprint endpoint lives here; credential flows are
//! served by the resource routers mounted behind the pipeline.

use axum::extract::State;

use crate::application::dto::FingerprintResponse;
use crate::application::services::FingerprintService;
use crate::shared::envelope::ApiResponse;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Issue an anonymous client fingerprint
///
/// Generation runs inline: if the clock has stepped backwards it may block
/// this worker thread for up to `snowflake.max_clock_skew_ms` (capped at
/// 50 ms) before failing with a 500.
pub async fn fingerprint(
    State(state): State<AppState>,
) -> Result<ApiResponse<FingerprintResponse>, AppError> {
    let fingerprint = FingerprintService::new(state.snowflake.clone()).issue()?;
    Ok(ApiResponse::ok(fingerprint.into()))
}
