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

//! Errors returned while using a [TokenCredential].
//!
//! Errors while *creating* a credential are reported with
//! [build_errors::Error][crate::build_errors::Error].
//!
//! [TokenCredential]: crate::credential::TokenCredential

use std::error::Error;
use std::sync::Arc;

type ArcError = Arc<dyn Error + Send + Sync + 'static>;

/// Represents an error using a [TokenCredential].
///
/// The type is `Clone`: when several callers wait on the same refresh, all of
/// them receive the same error.
///
/// [TokenCredential]: crate::credential::TokenCredential
#[derive(Clone, Debug, thiserror::Error)]
#[error(transparent)]
pub struct CredentialError(ErrorKind);

impl CredentialError {
    /// The credential was closed before (or while) the operation was issued.
    pub fn is_closed(&self) -> bool {
        matches!(self.0, ErrorKind::Closed)
    }

    /// The cached token is expired or missing, and there is no refresher.
    pub fn is_no_token(&self) -> bool {
        matches!(self.0, ErrorKind::NoTokenAvailable)
    }

    /// The refresher completed but did not produce a token.
    pub fn is_invalid_refresher_result(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidRefresherResult)
    }

    /// The refresher produced a token that the parser rejected.
    pub fn is_parsing(&self) -> bool {
        matches!(self.0, ErrorKind::Parsing(_))
    }

    /// The refresher itself failed.
    pub fn is_refresh(&self) -> bool {
        matches!(self.0, ErrorKind::Refresh(_))
    }

    /// The token cannot be used as an HTTP header value.
    pub fn is_header(&self) -> bool {
        matches!(self.0, ErrorKind::Header(_))
    }

    pub(crate) fn closed() -> Self {
        Self(ErrorKind::Closed)
    }

    pub(crate) fn no_token() -> Self {
        Self(ErrorKind::NoTokenAvailable)
    }

    pub(crate) fn invalid_refresher_result() -> Self {
        Self(ErrorKind::InvalidRefresherResult)
    }

    pub(crate) fn parsing<T>(source: T) -> Self
    where
        T: Error + Send + Sync + 'static,
    {
        Self(ErrorKind::Parsing(Arc::new(source)))
    }

    pub(crate) fn refresh<T>(source: T) -> Self
    where
        T: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self(ErrorKind::Refresh(Arc::from(source.into())))
    }

    pub(crate) fn header<T>(source: T) -> Self
    where
        T: Error + Send + Sync + 'static,
    {
        Self(ErrorKind::Header(Arc::new(source)))
    }
}

#[derive(Clone, Debug, thiserror::Error)]
enum ErrorKind {
    #[error("the credential is closed")]
    Closed,
    #[error("the token is expired or missing, and the credential cannot refresh it")]
    NoTokenAvailable,
    #[error("the token refresher completed without returning a token")]
    InvalidRefresherResult,
    #[error("cannot parse the refreshed token: {0}")]
    Parsing(#[source] ArcError),
    #[error("the token refresher failed: {0}")]
    Refresh(#[source] ArcError),
    #[error("cannot format the token as a header value: {0}")]
    Header(#[source] ArcError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        let error = CredentialError::closed();
        assert!(error.is_closed(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");

        let error = CredentialError::no_token();
        assert!(error.is_no_token(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");

        let error = CredentialError::invalid_refresher_result();
        assert!(error.is_invalid_refresher_result(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");

        let error = CredentialError::parsing(std::fmt::Error);
        assert!(error.is_parsing(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");

        let error = CredentialError::refresh("test message");
        assert!(error.is_refresh(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(error.to_string().contains("test message"), "{error}");
    }

    #[test]
    fn clones_share_source() {
        let error = CredentialError::refresh("epic fail");
        let clone = error.clone();
        assert!(clone.is_refresh(), "{clone:?}");
        assert_eq!(error.to_string(), clone.to_string());
    }
}
