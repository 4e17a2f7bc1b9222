//! Anonymous client fingerprints.
//!
//! A fingerprint pairs a snowflake (unique, time-ordered) with a random
//! token (unguessable): `<snowflake>.<token>`.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use serde::{Serialize, Serializer};

use super::Snowflake;

/// Random bytes behind every fingerprint token.
pub const TOKEN_BYTES: usize = 16;

/// Separator between the snowflake and the token.
pub const DELIMITER: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FingerprintParseError {
    #[error("fingerprint is missing the '.' delimiter")]
    MissingDelimiter,
    #[error("fingerprint id is not a snowflake")]
    InvalidId,
    #[error("fingerprint token is not url-safe base64 of at least 16 bytes")]
    InvalidToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    id: Snowflake,
    token: String,
}

impl Fingerprint {
    /// Pair an already-generated snowflake with a fresh random token.
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            token: random_token(),
        }
    }

    pub fn id(&self) -> Snowflake {
        self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Generate a URL-safe token from the thread-local CSPRNG.
fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.id, DELIMITER, self.token)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, token) = s
            .split_once(DELIMITER)
            .ok_or(FingerprintParseError::MissingDelimiter)?;

        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FingerprintParseError::InvalidId);
        }
        let id = id.parse().map_err(|_| FingerprintParseError::InvalidId)?;

        let decoded = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| FingerprintParseError::InvalidToken)?;
        if decoded.len() < TOKEN_BYTES {
            return Err(FingerprintParseError::InvalidToken);
        }

        Ok(Self {
            id,
            token: token.to_string(),
        })
    }
}
