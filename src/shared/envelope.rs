//! Response Envelopes
//!
//! Handlers never write bytes. They return an [`ApiResponse`] (or an
//! `AppError`), which leaves the body as a structured [`Envelope`] in the
//! response extensions. The response pipeline middleware encodes it with the
//! configured codec.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::shared::error::AppError;

/// Structured body waiting to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(pub Value);

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        response.extensions_mut().insert(self);
        response
    }
}

/// Successful handler result with its declared status (default 200).
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn created(body: T) -> Self {
        Self::with_status(StatusCode::CREATED, body)
    }

    pub fn with_status(status: StatusCode, body: T) -> Self {
        Self { status, body }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.body) {
            Ok(value) => (self.status, Envelope(value)).into_response(),
            Err(e) => AppError::internal(format!("Failed to serialize response: {}", e)).into_response(),
        }
    }
}
