//! Structured Body Codec
//!
//! Every response body and every decoded request payload passes through a
//! single injectable [`Codec`]. Handlers and errors produce
//! `serde_json::Value` trees; the codec decides the wire format.

use bytes::Bytes;
use serde_json::Value;

/// Codec failures. Never shown to clients.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode body: {0}")]
    Encode(String),

    #[error("failed to decode body: {0}")]
    Decode(String),
}

/// Encode/decode pair for structured values.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<Bytes, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// Content-Type header value for encoded bodies.
    fn content_type(&self) -> &'static str;
}

/// JSON codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
