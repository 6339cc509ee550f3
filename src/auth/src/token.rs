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

//! Types and functions to work with bearer tokens.

// Using tokio's wrapper makes expirations testable without relying on clock times.
use tokio::time::Instant;

/// Represents a bearer token and its expiration.
///
/// Tokens are immutable. A refresh replaces the cached token as a whole.
#[derive(Clone, PartialEq)]
pub struct Token {
    /// The actual token string.
    ///
    /// This is the value used in the `Authorization:` header.
    pub token: String,

    /// The instant at which the token expires.
    ///
    /// Note that the `Instant` is not valid across processes. If you need to
    /// copy an expiration across processes, consider converting it to a
    /// `time::OffsetDateTime` first.
    pub expires_at: Instant,
}

impl Token {
    /// Returns `true` if the token has expired at the current instant.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token", &"[censored]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
