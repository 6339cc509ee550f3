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

//! Application-supplied token refreshers.
//!
//! A refresher fetches a new serialized token, typically from a token service
//! owned by the application. The credential treats it as a black box: it
//! either returns a token, returns nothing, or fails. The credential does not
//! retry failed refreshes, and does not impose a timeout on them.
//!
//! Any `async` closure returning [RefreshResult] is a refresher:
//!
//! ```
//! # use token_credential::refresher::{RefreshCallback, RefreshResult};
//! # tokio_test::block_on(async {
//! let refresher = || async { RefreshResult::Ok(Some("my-serialized-token".to_string())) };
//! let token = refresher.refresh().await?;
//! assert_eq!(token.as_deref(), Some("my-serialized-token"));
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! # });
//! ```
//!
//! Blocking functions can be adapted with [sync_refresher].

use std::future::Future;
use std::sync::Arc;

/// The error type returned by refreshers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result of a refresh.
///
/// `Ok(None)` means the refresher completed without producing a token. The
/// credential reports this as an
/// [invalid refresher result](crate::errors::CredentialError::is_invalid_refresher_result).
pub type RefreshResult = std::result::Result<Option<String>, BoxError>;

/// Produces new serialized tokens on demand.
#[async_trait::async_trait]
pub trait RefreshCallback: Send + Sync {
    async fn refresh(&self) -> RefreshResult;
}

#[async_trait::async_trait]
impl<F, Fut> RefreshCallback for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = RefreshResult> + Send,
{
    async fn refresh(&self) -> RefreshResult {
        (self)().await
    }
}

/// Adapts a blocking function into a [RefreshCallback].
///
/// The function runs on the blocking thread pool, it never stalls the
/// asynchronous worker threads.
///
/// # Example
/// ```
/// # use token_credential::refresher::{RefreshCallback, sync_refresher};
/// # tokio_test::block_on(async {
/// let refresher = sync_refresher(|| Ok(Some("my-serialized-token".to_string())));
/// let token = refresher.refresh().await?;
/// assert_eq!(token.as_deref(), Some("my-serialized-token"));
/// # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
/// # });
/// ```
pub fn sync_refresher<F>(function: F) -> SyncRefresher<F>
where
    F: Fn() -> RefreshResult + Send + Sync + 'static,
{
    SyncRefresher {
        function: Arc::new(function),
    }
}

/// A [RefreshCallback] wrapping a blocking function.
///
/// Created by [sync_refresher].
pub struct SyncRefresher<F> {
    function: Arc<F>,
}

impl<F> std::fmt::Debug for SyncRefresher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRefresher").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<F> RefreshCallback for SyncRefresher<F>
where
    F: Fn() -> RefreshResult + Send + Sync + 'static,
{
    async fn refresh(&self) -> RefreshResult {
        let function = self.function.clone();
        match tokio::task::spawn_blocking(move || function()).await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // Used by tests in other modules.
    mockall::mock! {
        pub RefreshCallback { }

        #[async_trait::async_trait]
        impl RefreshCallback for RefreshCallback {
            async fn refresh(&self) -> RefreshResult;
        }
    }

    #[tokio::test]
    async fn closure() -> Result<(), BoxError> {
        let refresher = || async { RefreshResult::Ok(Some("token-test-only".to_string())) };
        let got = refresher.refresh().await?;
        assert_eq!(got.as_deref(), Some("token-test-only"));
        Ok(())
    }

    #[tokio::test]
    async fn closure_no_value() -> Result<(), BoxError> {
        let refresher = || async { RefreshResult::Ok(None) };
        let got = refresher.refresh().await?;
        assert!(got.is_none(), "{got:?}");
        Ok(())
    }

    #[tokio::test]
    async fn blocking() -> Result<(), BoxError> {
        let refresher = sync_refresher(|| {
            std::thread::sleep(std::time::Duration::from_millis(10));
            Ok(Some("token-test-only".to_string()))
        });
        let got = refresher.refresh().await?;
        assert_eq!(got.as_deref(), Some("token-test-only"));
        Ok(())
    }

    #[tokio::test]
    async fn blocking_error() {
        let refresher = sync_refresher(|| Err("epic fail".into()));
        let err = refresher.refresh().await.unwrap_err();
        assert!(err.to_string().contains("epic fail"), "{err}");
    }

    #[tokio::test]
    async fn blocking_panic() {
        let refresher = sync_refresher(|| panic!("test-only panic"));
        let err = refresher.refresh().await.unwrap_err();
        assert!(err.to_string().contains("panic"), "{err}");
    }

    #[test]
    fn debug() {
        let refresher = sync_refresher(|| Ok(None));
        let got = format!("{refresher:?}");
        assert!(got.contains("SyncRefresher"), "{got}");
    }
}
