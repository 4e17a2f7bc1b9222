//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! Every failure a client can observe is one of the [`AppError`] variants.
//! Each maps to a fixed `(code, message, status)` triple; detail carried by
//! [`AppError::Internal`] is logged and never serialized.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::shared::codec::CodecError;
use crate::shared::envelope::Envelope;
use crate::shared::snowflake::SnowflakeError;

/// Code used by the fixed framework-level errors.
pub const GENERIC_ERROR_CODE: u32 = 0;

/// Code reported for malformed client payloads.
pub const MALFORMED_REQUEST_CODE: u32 = 50035;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Malformed request")]
    MalformedRequest,

    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: f64 },

    #[error("Application error {code}: {message}")]
    Application {
        code: u32,
        message: String,
        status: StatusCode,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
}

/// Rate limit exceeded body
#[derive(Debug, Serialize)]
pub struct RateLimitedResponse {
    pub retry_after: f64,
    pub message: String,
}

impl AppError {
    /// Raised by domain handlers with an explicit code and status.
    pub fn application(code: u32, message: impl Into<String>, status: StatusCode) -> Self {
        AppError::Application {
            code,
            message: message.into(),
            status,
        }
    }

    pub fn internal(detail: impl ToString) -> Self {
        AppError::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MalformedRequest => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Application { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible body for this error.
    pub fn body(&self) -> serde_json::Value {
        let status = self.status();
        let body = match self {
            AppError::RateLimited { retry_after } => serde_json::to_value(RateLimitedResponse {
                retry_after: retry_after.max(0.0),
                message: status_message(status),
            }),
            AppError::Application { code, message, .. } => serde_json::to_value(ErrorResponse {
                code: *code,
                message: message.clone(),
            }),
            AppError::MalformedRequest => serde_json::to_value(ErrorResponse {
                code: MALFORMED_REQUEST_CODE,
                message: "403: Malformed Request".into(),
            }),
            AppError::NotFound | AppError::MethodNotAllowed | AppError::Internal(_) => {
                serde_json::to_value(ErrorResponse {
                    code: GENERIC_ERROR_CODE,
                    message: status_message(status),
                })
            }
        };
        body.unwrap_or_default()
    }
}

/// `"<status>: <reason phrase>"`, e.g. `"404: Not Found"`.
fn status_message(status: StatusCode) -> String {
    format!(
        "{}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(detail) => tracing::error!("Internal error: {}", detail),
            AppError::Application { code, status, .. } if status.is_server_error() => {
                tracing::error!(code, status = status.as_u16(), "Application error")
            }
            _ => tracing::debug!(error = %self, "Request failed"),
        }

        (self.status(), Envelope(self.body())).into_response()
    }
}

impl From<SnowflakeError> for AppError {
    fn from(e: SnowflakeError) -> Self {
        AppError::Internal(format!("Snowflake error: {}", e))
    }
}

impl From<CodecError> for AppError {
    fn from(e: CodecError) -> Self {
        AppError::Internal(format!("Codec error: {}", e))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", e))
    }
}
