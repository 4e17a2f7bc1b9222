//! Custom Extractors
//!
//! Request extractors whose rejections stay inside the error taxonomy: any
//! problem with client input surfaces as `MalformedRequest`, without naming
//! the field or parser that failed.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::domain::value_objects::Snowflake;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Request body decoded through the configured codec.
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<T> FromRequest<AppState> for Payload<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::MalformedRequest)?;

        let value = state.codec.decode(&bytes).map_err(|e| {
            tracing::debug!("Rejecting request body: {}", e);
            AppError::MalformedRequest
        })?;

        serde_json::from_value(value).map(Payload).map_err(|e| {
            tracing::debug!("Request body has the wrong shape: {}", e);
            AppError::MalformedRequest
        })
    }
}

/// Single snowflake path parameter, e.g. `/guilds/{guild_id}`.
#[derive(Debug, Clone, Copy)]
pub struct SnowflakePath(pub Snowflake);

impl<S> FromRequestParts<S> for SnowflakePath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::MalformedRequest)?;

        raw.parse::<Snowflake>()
            .ok()
            .filter(|id| id.as_i64() >= 0)
            .map(SnowflakePath)
            .ok_or(AppError::MalformedRequest)
    }
}
