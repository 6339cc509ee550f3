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

use crate::parser::{JwtTokenParser, TokenParser};
use crate::refresher::RefreshCallback;
use std::sync::Arc;
use std::time::Duration;

/// How long before expiration a proactive refresh starts, unless configured.
pub const DEFAULT_REFRESH_OFFSET: Duration = Duration::from_secs(5 * 60);

/// Configures a [TokenCredential] that can refresh its token.
///
/// # Example
/// ```
/// # use token_credential::options::RefreshOptions;
/// # use token_credential::refresher::RefreshResult;
/// # use std::time::Duration;
/// let options = RefreshOptions::new()
///     .with_refresher(|| async { RefreshResult::Ok(Some(fetch_token_from_my_service())) })
///     .with_proactive_refresh(true)
///     .with_refresh_offset(Duration::from_secs(120));
/// # fn fetch_token_from_my_service() -> String { String::new() }
/// ```
///
/// [TokenCredential]: crate::credential::TokenCredential
#[derive(Clone)]
pub struct RefreshOptions {
    pub(crate) refresher: Option<Arc<dyn RefreshCallback>>,
    pub(crate) proactive: bool,
    pub(crate) initial_token: Option<String>,
    pub(crate) offset: Duration,
    pub(crate) parser: Arc<dyn TokenParser>,
}

impl RefreshOptions {
    /// Creates options without a refresher.
    ///
    /// A refresher is required, see [with_refresher][Self::with_refresher].
    pub fn new() -> Self {
        Self {
            refresher: None,
            proactive: false,
            initial_token: None,
            offset: DEFAULT_REFRESH_OFFSET,
            parser: Arc::new(JwtTokenParser),
        }
    }

    /// Sets the function used to fetch new tokens.
    pub fn with_refresher<T>(mut self, refresher: T) -> Self
    where
        T: RefreshCallback + 'static,
    {
        self.refresher = Some(Arc::new(refresher));
        self
    }

    /// Enables (or disables) refreshing the token in the background, before
    /// it expires.
    ///
    /// When disabled, the token is only refreshed when it is requested after
    /// it has expired.
    pub fn with_proactive_refresh(mut self, v: bool) -> Self {
        self.proactive = v;
        self
    }

    /// Seeds the credential with a serialized token.
    ///
    /// Without an initial token the first request for a token calls the
    /// refresher.
    pub fn with_initial_token<T: Into<String>>(mut self, token: T) -> Self {
        self.initial_token = Some(token.into());
        self
    }

    /// Sets how long before expiration a proactive refresh starts.
    ///
    /// The offset is not validated against the token lifetime. If the offset
    /// is larger than the remaining lifetime the refresh starts immediately.
    /// Defaults to [DEFAULT_REFRESH_OFFSET].
    pub fn with_refresh_offset(mut self, v: Duration) -> Self {
        self.offset = v;
        self
    }

    /// Sets the parser for the initial and refreshed tokens.
    ///
    /// Defaults to [JwtTokenParser].
    pub fn with_parser<T>(mut self, parser: T) -> Self
    where
        T: TokenParser + 'static,
    {
        self.parser = Arc::new(parser);
        self
    }
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RefreshOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshOptions")
            .field("refresher", &self.refresher.as_ref().map(|_| "[refresher]"))
            .field("proactive", &self.proactive)
            .field(
                "initial_token",
                &self.initial_token.as_ref().map(|_| "[censored]"),
            )
            .field("offset", &self.offset)
            .field("parser", &self.parser)
            .finish()
    }
}
