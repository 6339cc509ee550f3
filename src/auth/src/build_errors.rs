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

//! Errors created during credential construction.

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for [TokenCredential] constructors.
///
/// Applications rarely need to create instances of this error type. The
/// exception might be when testing application code, where the application is
/// mocking a client library behavior.
///
/// [TokenCredential]: crate::credential::TokenCredential
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// A problem parsing the static or initial token.
    pub fn is_parsing(&self) -> bool {
        matches!(self.0, ErrorKind::Parsing(_))
    }

    /// A required field was missing from the options.
    pub fn is_missing_field(&self) -> bool {
        matches!(self.0, ErrorKind::MissingField(_))
    }

    /// Proactive refresh was requested outside of a Tokio runtime.
    pub fn is_missing_runtime(&self) -> bool {
        matches!(self.0, ErrorKind::MissingRuntime(_))
    }

    /// The options are invalid, for example, a required field is missing.
    pub fn is_invalid_config(&self) -> bool {
        self.is_missing_field() || self.is_missing_runtime()
    }

    /// A problem parsing a token.
    pub(crate) fn parsing<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Parsing(source.into()))
    }

    /// A required field was missing from the options.
    pub(crate) fn missing_field(field: &'static str) -> Error {
        Error(ErrorKind::MissingField(field))
    }

    /// There is no Tokio runtime to run the background refresh.
    pub(crate) fn missing_runtime<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::MissingRuntime(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("cannot parse the token: {0}")]
    Parsing(#[source] BoxError),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("proactive refresh requires a Tokio runtime: {0}")]
    MissingRuntime(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn constructors() {
        let error = Error::parsing("test message");
        assert!(error.is_parsing(), "{error:?}");
        assert!(!error.is_invalid_config(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(error.to_string().contains("test message"), "{error}");

        let error = Error::missing_field("test field");
        assert!(error.is_missing_field(), "{error:?}");
        assert!(error.is_invalid_config(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");
        assert!(error.to_string().contains("test field"), "{error}");

        let error = Error::missing_runtime("test message");
        assert!(error.is_missing_runtime(), "{error:?}");
        assert!(!error.is_missing_field(), "{error:?}");
        assert!(error.is_invalid_config(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
    }
}
