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

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use token_credential::credential::TokenCredential;
use token_credential::options::RefreshOptions;
use token_credential::parser::{ParseError, TokenParser};
use token_credential::refresher::{RefreshResult, sync_refresher};
use token_credential::token::Token;

type TestResult = anyhow::Result<()>;

#[cfg(test)]
mod test {
    use super::*;
    use http::header::{AUTHORIZATION, HeaderValue};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn jwt(lifetime_secs: i64) -> String {
        let exp = time::OffsetDateTime::now_utc().unix_timestamp() + lifetime_secs;
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"skypeid":"communication:test-resource.test-user","scp":1024,"exp":{exp}}}"#
        ));
        format!("{header}.{payload}.test-only-signature")
    }

    #[tokio::test]
    async fn static_jwt() -> TestResult {
        let serialized = jwt(3600);
        let credential = TokenCredential::new(&serialized)?;

        let token = credential.token().await?;
        assert_eq!(token.token, serialized);
        assert!(!token.is_expired(), "{token:?}");

        let headers = credential.headers().await?;
        let want = HeaderValue::from_str(&format!("Bearer {serialized}"))?;
        assert_eq!(headers.get(AUTHORIZATION), Some(&want));
        Ok(())
    }

    #[tokio::test]
    async fn static_jwt_expired() -> TestResult {
        let credential = TokenCredential::new(jwt(-60))?;
        let err = credential.token().await.unwrap_err();
        assert!(err.is_no_token(), "{err:?}");
        Ok(())
    }

    #[test]
    fn static_jwt_malformed() {
        let err = TokenCredential::new("header.payload").unwrap_err();
        assert!(err.is_parsing(), "{err:?}");
    }

    #[tokio::test]
    async fn refresh_on_demand() -> TestResult {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let refresher = move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                RefreshResult::Ok(Some(jwt(3600)))
            }
        };
        let credential = TokenCredential::with_options(
            RefreshOptions::new()
                .with_refresher(refresher)
                .with_initial_token(jwt(-60)),
        )?;

        let first = credential.token().await?;
        assert!(!first.is_expired(), "{first:?}");
        let second = credential.token().await?;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_with_blocking_function() -> TestResult {
        let credential = TokenCredential::with_options(
            RefreshOptions::new().with_refresher(sync_refresher(|| Ok(Some(jwt(3600))))),
        )?;
        let token = credential.token().await?;
        assert!(!token.is_expired(), "{token:?}");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_returns_malformed_token() -> TestResult {
        let credential = TokenCredential::with_options(
            RefreshOptions::new()
                .with_refresher(|| async { RefreshResult::Ok(Some("not-a-jwt".to_string())) }),
        )?;
        let err = credential.token().await.unwrap_err();
        assert!(err.is_parsing(), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_returns_nothing() -> TestResult {
        let credential = TokenCredential::with_options(
            RefreshOptions::new().with_refresher(|| async { RefreshResult::Ok(None) }),
        )?;
        let err = credential.token().await.unwrap_err();
        assert!(err.is_invalid_refresher_result(), "{err:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_share_refresh() -> TestResult {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let refresher = move || {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                RefreshResult::Ok(Some(jwt(3600)))
            }
        };
        let credential =
            TokenCredential::with_options(RefreshOptions::new().with_refresher(refresher))?;

        let tasks = (0..32)
            .map(|_| {
                let credential = credential.clone();
                tokio::spawn(async move { credential.token().await })
            })
            .collect::<Vec<_>>();
        let mut tokens = Vec::new();
        for task in tasks {
            tokens.push(task.await??);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tokens.windows(2).all(|w| w[0] == w[1]), "{tokens:?}");
        Ok(())
    }

    #[tokio::test]
    async fn proactive_refresh_and_close() -> TestResult {
        // A token that expires in 10 minutes, with the default 5 minute offset.
        let credential = TokenCredential::with_options(
            RefreshOptions::new()
                .with_refresher(|| async { RefreshResult::Ok(Some(jwt(1200))) })
                .with_initial_token(jwt(600))
                .with_proactive_refresh(true),
        )?;
        assert!(credential.has_proactive_fetcher(), "{credential:?}");
        let next = credential
            .next_fetch_at()
            .ok_or_else(|| anyhow::anyhow!("missing fetch time in {credential:?}"))?;
        let delay = next - Instant::now();
        assert!(delay <= Duration::from_secs(300), "{delay:?}");
        assert!(delay >= Duration::from_secs(290), "{delay:?}");

        credential.close();
        credential.close();
        assert!(credential.is_closed(), "{credential:?}");
        assert!(!credential.has_proactive_fetcher(), "{credential:?}");
        let err = credential.token().await.unwrap_err();
        assert!(err.is_closed(), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn custom_parser() -> TestResult {
        // Tokens of the form `<value>;<lifetime in seconds>`.
        #[derive(Debug)]
        struct Parser;
        impl TokenParser for Parser {
            fn parse(&self, serialized: &str) -> Result<Token, ParseError> {
                let (value, lifetime) = serialized
                    .split_once(';')
                    .ok_or_else(|| ParseError::other("missing lifetime"))?;
                let lifetime = lifetime
                    .parse::<u64>()
                    .map_err(|e| ParseError::other(e.to_string()))?;
                Ok(Token {
                    token: value.to_string(),
                    expires_at: Instant::now() + Duration::from_secs(lifetime),
                })
            }
        }

        let credential = TokenCredential::with_options(
            RefreshOptions::new()
                .with_refresher(|| async { RefreshResult::Ok(Some("opaque;3600".to_string())) })
                .with_parser(Parser),
        )?;
        let token = credential.token().await?;
        assert_eq!(token.token, "opaque");

        let err = TokenCredential::with_parser("opaque", Parser).unwrap_err();
        assert!(err.is_parsing(), "{err:?}");
        Ok(())
    }
}
