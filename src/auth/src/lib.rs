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

//! Bearer token credentials with on-demand and proactive refresh.
//!
//! **WARNING:** this crate is under active development. We expect multiple
//! breaking changes in the upcoming releases.
//!
//! This crate holds short-lived bearer tokens, issued by a token service that
//! the application owns, and hands them out to the code that authenticates
//! requests. A [credential::TokenCredential] either holds a static token, or
//! calls an application-supplied [refresher::RefreshCallback] to fetch new
//! tokens:
//!
//! - on demand, when a token is requested and the cached token has expired,
//! - proactively, in a background task, a configurable time before the cached
//!   token expires.
//!
//! Concurrent requests for a token share a single call to the refresher.
//!
//! The credential does not validate tokens, it only reads their expiration.
//! Tokens are parsed as JWTs by default, see [parser] to use other formats.

pub mod build_errors;
pub mod errors;
pub mod token;

pub mod parser;

pub mod refresher;

/// Configuration for credentials that refresh their token.
pub mod options;

pub mod credential;

/// The background task used for proactive refreshes.
pub(crate) mod fetching_task;

/// Headers utility functions.
pub(crate) mod headers_util;

/// A `Result` alias where the `Err` case is
/// `token_credential::errors::CredentialError`.
pub(crate) type Result<T> = std::result::Result<T, crate::errors::CredentialError>;
