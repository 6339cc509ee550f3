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

//! This crate contains a number of guides showing how to use the
//! `token-credential` crate.

pub mod logging;
pub mod proactive_refresh;
pub mod static_token;

/// Creates an unsigned JWT expiring `lifetime_secs` from now.
///
/// Applications receive tokens from their own token service, the samples use
/// this function to stand in for that service.
pub fn fake_token_service(lifetime_secs: i64) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + lifetime_secs;
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"skypeid":"communication:sample-resource.sample-user","exp":{exp}}}"#
    ));
    format!("{header}.{payload}.")
}
