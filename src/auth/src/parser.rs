// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Turn serialized tokens into [Token] values.
//!
//! The credential does not interpret tokens beyond their expiration. The
//! [TokenParser] trait lets applications plug in whatever encoding their
//! token service uses. The default, [JwtTokenParser], reads the `exp` claim of
//! a compact JWT.

use crate::token::Token;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::time::Instant;

/// The error returned by a [TokenParser].
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("expected three `.` separated segments, found {0}")]
    Segments(usize),
    #[error("the payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("the payload is not a valid JSON object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the payload has no `exp` claim")]
    MissingExpiration,
    #[error("the `exp` claim is out of range: {0}")]
    InvalidExpiration(f64),
    #[error("{0}")]
    Other(String),
}

impl ParseError {
    /// Creates an error with a custom message, for use in custom parsers.
    pub fn other<T: Into<String>>(message: T) -> Self {
        Self::Other(message.into())
    }
}

/// Turns a serialized token into a [Token].
///
/// Implementations must be pure: the same input yields the same token value
/// and expiration.
pub trait TokenParser: std::fmt::Debug + Send + Sync {
    fn parse(&self, serialized: &str) -> Result<Token, ParseError>;
}

/// Parses compact JWTs, reading the expiration from the `exp` claim.
///
/// The parser does not validate signatures. Tokens are opaque to the client,
/// the service that receives them performs any validation.
#[derive(Clone, Debug, Default)]
pub struct JwtTokenParser;

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
}

impl TokenParser for JwtTokenParser {
    fn parse(&self, serialized: &str) -> Result<Token, ParseError> {
        let segments = serialized.split('.').collect::<Vec<_>>();
        let [_, payload, _] = segments[..] else {
            return Err(ParseError::Segments(segments.len()));
        };
        let payload = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let claims = serde_json::from_slice::<Claims>(&payload)?;
        let exp = claims.exp.ok_or(ParseError::MissingExpiration)?;
        let expires_at = expiration_instant(exp).ok_or(ParseError::InvalidExpiration(exp))?;
        Ok(Token {
            token: serialized.to_string(),
            expires_at,
        })
    }
}

// Maps a wall-clock expiration (seconds since the epoch) to a monotonic instant.
fn expiration_instant(exp: f64) -> Option<Instant> {
    if !exp.is_finite() {
        return None;
    }
    let expires_at = OffsetDateTime::from_unix_timestamp(exp.trunc() as i64).ok()?;
    let now = Instant::now();
    let remaining = expires_at - OffsetDateTime::now_utc();
    if remaining.is_positive() {
        now.checked_add(remaining.unsigned_abs())
    } else {
        Some(now.checked_sub(remaining.unsigned_abs()).unwrap_or(now))
    }
}
