//! Fallback Handlers
//!
//! Requests the router cannot dispatch.

use crate::shared::error::AppError;

/// No route matched the path
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// A route matched the path but not the method
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
