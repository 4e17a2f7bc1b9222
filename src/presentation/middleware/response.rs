//! Response Pipeline
//!
//! Outermost application middleware. For every request it:
//! 1. installs a fresh [`RequestContext`],
//! 2. runs the inner stack (rate limiting, routing, handlers),
//! 3. encodes the structured body with the configured codec,
//! 4. maps bare framework errors onto the error taxonomy,
//! 5. attaches `X-RateLimit-*` headers when a decision was recorded.

use std::any::Any;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::infrastructure::metrics;
use crate::presentation::middleware::context::RequestContext;
use crate::presentation::middleware::rate_limit::add_rate_limit_headers;
use crate::shared::codec::Codec;
use crate::shared::envelope::Envelope;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Served when the codec itself fails; never goes through the codec.
const ENCODE_FAILURE_BODY: &str = r#"{"code":0,"message":"500: Internal Server Error"}"#;

pub async fn response_pipeline(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();

    let context = RequestContext::new();
    request.extensions_mut().insert(context.clone());

    let response = next.run(request).await;
    let response = normalize_error(response);
    let mut response = encode_envelope(state.codec.as_ref(), response);

    if let Some(decision) = context.rate_limit() {
        add_rate_limit_headers(response.headers_mut(), decision, state.rate_limiter.now_millis());
    }

    metrics::record_http_request(
        method.as_str(),
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// Replace error responses produced outside the taxonomy (extractor
/// rejections, framework defaults) with their taxonomy equivalent.
fn normalize_error(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.extensions().get::<Envelope>().is_some()
    {
        return response;
    }

    tracing::debug!(status = status.as_u16(), "Normalizing bare error response");
    let error = match status {
        StatusCode::NOT_FOUND => AppError::NotFound,
        StatusCode::METHOD_NOT_ALLOWED => AppError::MethodNotAllowed,
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited { retry_after: 0.0 },
        s if s.is_client_error() => AppError::MalformedRequest,
        s => AppError::Internal(format!("Unhandled {} response", s)),
    };
    error.into_response()
}

/// Encode a stashed [`Envelope`] into the response body.
fn encode_envelope(codec: &dyn Codec, response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    let Some(Envelope(value)) = parts.extensions.remove::<Envelope>() else {
        return Response::from_parts(parts, body);
    };

    match codec.encode(&value) {
        Ok(bytes) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(codec.content_type()),
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!("Response encoding failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                ENCODE_FAILURE_BODY,
            )
                .into_response()
        }
    }
}

/// Panic handler for `CatchPanicLayer`: the panic becomes an opaque 500.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}
