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

//! The [TokenCredential] type.
//!
//! A credential holds a bearer token, hands it out on demand, and refreshes it
//! when it expires. With proactive refresh enabled the credential also
//! refreshes the token in the background, ahead of its expiration, so callers
//! rarely wait for a refresh.
//!
//! Example usage:
//!
//! ```
//! # use token_credential::credential::TokenCredential;
//! # use token_credential::options::RefreshOptions;
//! # use token_credential::refresher::RefreshResult;
//! # tokio_test::block_on(async {
//! let options = RefreshOptions::new()
//!     .with_refresher(|| async { RefreshResult::Ok(Some(fetch_token_from_my_service().await)) })
//!     .with_proactive_refresh(true);
//! let credential = TokenCredential::with_options(options)?;
//! let token = credential.token().await?;
//! println!("Token: {token:?}");
//! credential.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! # async fn fetch_token_from_my_service() -> String {
//! #     use base64::Engine;
//! #     let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
//! #     let exp = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
//! #     format!("{}.{}.", engine.encode("{}"), engine.encode(format!(r#"{{"exp":{exp}}}"#)))
//! # }
//! ```

use crate::Result;
use crate::build_errors::Error as BuildError;
use crate::errors::CredentialError;
use crate::fetching_task::FetchingTask;
use crate::headers_util::build_bearer_headers;
use crate::options::{DEFAULT_REFRESH_OFFSET, RefreshOptions};
use crate::parser::{JwtTokenParser, TokenParser};
use crate::refresher::RefreshCallback;
use crate::token::Token;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use http::HeaderMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;

type BuildResult<T> = std::result::Result<T, BuildError>;

// All callers waiting on a refresh share one future, and its result.
type SharedRefresh = Shared<BoxFuture<'static, Result<Token>>>;

/// Holds a bearer token and refreshes it as needed.
///
/// Credentials are cheap to clone, all clones share the same token, the same
/// refresher, and the same background refresh. Closing any clone closes all of
/// them.
///
/// Dropping the last clone cancels any background refresh.
#[derive(Clone)]
pub struct TokenCredential {
    inner: Arc<Inner>,
}

struct Inner {
    parser: Arc<dyn TokenParser>,
    // Runs the background refresh, only set with proactive refresh.
    runtime: Option<Handle>,
    offset: Duration,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    token: Option<Token>,
    refresher: Option<Arc<dyn RefreshCallback>>,
    fetching_task: Option<FetchingTask>,
    in_flight: Option<InFlight>,
    next_refresh_id: u64,
    closed: bool,
}

struct InFlight {
    id: u64,
    refresh: SharedRefresh,
}

enum Lookup {
    Cached(Token),
    Pending(SharedRefresh),
}

impl TokenCredential {
    /// Creates a credential holding a static, serialized JWT.
    ///
    /// The credential cannot refresh the token. Once the token expires all
    /// requests for a token fail.
    ///
    /// # Example
    /// ```
    /// # use token_credential::credential::TokenCredential;
    /// let err = TokenCredential::new("not-a-jwt").unwrap_err();
    /// assert!(err.is_parsing());
    /// ```
    pub fn new<T: AsRef<str>>(token: T) -> BuildResult<Self> {
        Self::with_parser(token, JwtTokenParser)
    }

    /// Creates a credential holding a static token, parsed with `parser`.
    pub fn with_parser<T, P>(token: T, parser: P) -> BuildResult<Self>
    where
        T: AsRef<str>,
        P: TokenParser + 'static,
    {
        let token = parser.parse(token.as_ref()).map_err(BuildError::parsing)?;
        let state = State {
            token: Some(token),
            ..State::default()
        };
        Ok(Self {
            inner: Arc::new(Inner {
                parser: Arc::new(parser),
                runtime: None,
                offset: DEFAULT_REFRESH_OFFSET,
                state: RwLock::new(state),
            }),
        })
    }

    /// Creates a credential that refreshes its token using the refresher in
    /// `options`.
    ///
    /// Fails if `options` has no refresher, or if the initial token cannot be
    /// parsed.
    ///
    /// With proactive refresh enabled, this must be called from within a Tokio
    /// runtime. The background refresh runs on that runtime. Fails with an
    /// [invalid configuration][BuildError::is_invalid_config] error otherwise.
    pub fn with_options(options: RefreshOptions) -> BuildResult<Self> {
        let RefreshOptions {
            refresher,
            proactive,
            initial_token,
            offset,
            parser,
        } = options;
        let refresher = refresher.ok_or_else(|| BuildError::missing_field("refresher"))?;
        let token = initial_token
            .map(|t| parser.parse(&t))
            .transpose()
            .map_err(BuildError::parsing)?;
        let runtime = proactive
            .then(Handle::try_current)
            .transpose()
            .map_err(BuildError::missing_runtime)?;

        let inner = Arc::new(Inner {
            parser,
            runtime,
            offset,
            state: RwLock::new(State {
                refresher: Some(refresher),
                ..State::default()
            }),
        });
        if let Some(token) = token {
            inner.publish(token);
        }
        Ok(Self { inner })
    }

    /// Returns a valid token, refreshing it if needed.
    ///
    /// A cached, unexpired token is returned without calling the refresher.
    /// Otherwise this calls the refresher. Concurrent callers share a single
    /// call to the refresher, and all of them receive its result.
    pub async fn token(&self) -> Result<Token> {
        match self.inner.lookup(false)? {
            Lookup::Cached(token) => Ok(token),
            Lookup::Pending(refresh) => refresh.await,
        }
    }

    /// Returns the headers to authenticate a request with the current token.
    ///
    /// The `authorization` header value is marked as sensitive.
    pub async fn headers(&self) -> Result<HeaderMap> {
        let token = self.token().await?;
        build_bearer_headers(&token)
    }

    /// Closes the credential.
    ///
    /// Cancels any background refresh and drops the refresher. All future
    /// requests for a token fail. Callers already waiting on a refresh receive
    /// its result.
    ///
    /// Closing a credential more than once has no additional effect.
    pub fn close(&self) {
        let (task, in_flight, refresher) = {
            let mut state = self.inner.write();
            if state.closed {
                return;
            }
            state.closed = true;
            state.token = None;
            (
                state.fetching_task.take(),
                state.in_flight.take(),
                state.refresher.take(),
            )
        };
        // Release these outside the lock, they may run application code.
        if let Some(mut task) = task {
            task.cancel();
        }
        drop(in_flight);
        drop(refresher);
        tracing::debug!("token credential closed");
    }

    /// Returns `true` once [close][Self::close] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    /// Returns `true` if the credential has a background refresh task.
    pub fn has_proactive_fetcher(&self) -> bool {
        self.inner.read().fetching_task.is_some()
    }

    /// The instant the next background refresh is scheduled for, if any.
    ///
    /// Returns `None` if there is no background refresh, or if the last one
    /// failed and nothing has refreshed the token since.
    pub fn next_fetch_at(&self) -> Option<Instant> {
        self.inner
            .read()
            .fetching_task
            .as_ref()
            .and_then(FetchingTask::next_fetch_at)
    }
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, State> {
        // The critical sections never panic, but do not propagate poisoning
        // if application code does.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // Finds a valid token, or the refresh that will produce one, starting a
    // new refresh if needed. With `force` a valid cached token is ignored.
    fn lookup(self: &Arc<Self>, force: bool) -> Result<Lookup> {
        if let Some(found) = Self::find(&self.read(), force)? {
            return Ok(found);
        }

        let mut state = self.write();
        // Another caller may have started a refresh while we waited for the lock.
        if let Some(found) = Self::find(&state, force)? {
            return Ok(found);
        }
        let refresher = state
            .refresher
            .clone()
            .ok_or_else(CredentialError::no_token)?;
        let id = state.next_refresh_id;
        state.next_refresh_id += 1;
        let refresh = refresh(Arc::downgrade(self), refresher, self.parser.clone(), id)
            .boxed()
            .shared();
        state.in_flight = Some(InFlight {
            id,
            refresh: refresh.clone(),
        });
        Ok(Lookup::Pending(refresh))
    }

    fn find(state: &State, force: bool) -> Result<Option<Lookup>> {
        if state.closed {
            return Err(CredentialError::closed());
        }
        if !force {
            if let Some(token) = state.token.as_ref().filter(|t| !t.is_expired()) {
                return Ok(Some(Lookup::Cached(token.clone())));
            }
        }
        Ok(state
            .in_flight
            .as_ref()
            .map(|f| Lookup::Pending(f.refresh.clone())))
    }

    // Records the outcome of refresh `id`. Failures leave the cached token
    // unchanged. Clearing the in-flight slot and caching the new token happen
    // under one lock, callers never observe the slot empty and the token stale.
    fn complete(self: &Arc<Self>, id: u64, result: &Result<Token>) {
        let mut state = self.write();
        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
            state.in_flight = None;
        }
        if let Ok(token) = result {
            self.publish_locked(&mut state, token.clone());
        }
    }

    fn publish(self: &Arc<Self>, token: Token) {
        let mut state = self.write();
        self.publish_locked(&mut state, token);
    }

    // Caches `token` and, with proactive refresh, reprograms the background
    // fetch relative to its expiration.
    fn publish_locked(self: &Arc<Self>, state: &mut State, token: Token) {
        if state.closed {
            return;
        }
        if let Some(runtime) = self.runtime.as_ref() {
            let at = self.fetch_at(&token);
            match state.fetching_task.as_mut() {
                Some(task) => task.reschedule(at),
                None => {
                    let weak = Arc::downgrade(self);
                    let task = FetchingTask::start(runtime, at, move || {
                        proactive_refresh(weak.clone()).boxed()
                    });
                    state.fetching_task = Some(task);
                }
            }
        }
        state.token = Some(token);
    }

    fn fetch_at(&self, token: &Token) -> Instant {
        token
            .expires_at
            .checked_sub(self.offset)
            .unwrap_or_else(Instant::now)
    }
}

async fn refresh(
    inner: Weak<Inner>,
    refresher: Arc<dyn RefreshCallback>,
    parser: Arc<dyn TokenParser>,
    id: u64,
) -> Result<Token> {
    tracing::debug!("refreshing token");
    let result = fetch(refresher.as_ref(), parser.as_ref()).await;
    drop(refresher);
    if let Some(inner) = inner.upgrade() {
        inner.complete(id, &result);
    }
    match &result {
        Ok(token) => tracing::debug!("token refreshed, expires at {:?}", token.expires_at),
        Err(e) => tracing::debug!("token refresh failed: {e}"),
    }
    result
}

async fn fetch(refresher: &dyn RefreshCallback, parser: &dyn TokenParser) -> Result<Token> {
    let serialized = refresher
        .refresh()
        .await
        .map_err(CredentialError::refresh)?
        .ok_or_else(CredentialError::invalid_refresher_result)?;
    parser.parse(&serialized).map_err(CredentialError::parsing)
}

// Runs when the background task fires. There is no caller waiting for the
// result, failures are reported and the task stays idle until a request for a
// token refreshes it.
async fn proactive_refresh(inner: Weak<Inner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let lookup = inner.lookup(true);
    // Do not keep the credential alive while the refresh runs.
    drop(inner);
    let result = match lookup {
        Ok(Lookup::Pending(refresh)) => refresh.await,
        Ok(Lookup::Cached(token)) => Ok(token),
        Err(e) if e.is_closed() => return,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::error!("background token refresh failed, will not retry: {e}");
    }
}

impl std::fmt::Debug for TokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl std::fmt::Debug for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("TokenCredential")
            .field("parser", &self.parser)
            .field("proactive", &self.runtime.is_some())
            .field("offset", &self.offset)
            .field("token", &state.token)
            .field("has_refresher", &state.refresher.is_some())
            .field("fetching_task", &state.fetching_task)
            .field("refresh_in_progress", &state.in_flight.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}
