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

// ANCHOR: static_token
// ANCHOR: static_token_parameter
/// # Parameters
/// - `token`: a serialized JWT, for example, as returned by your token service.
pub async fn sample(token: &str) -> anyhow::Result<()> {
    // ANCHOR_END: static_token_parameter
    // ANCHOR: static_token_use
    use token_credential::credential::TokenCredential;
    // ANCHOR_END: static_token_use

    // ANCHOR: static_token_credential
    let credential = TokenCredential::new(token)?;
    // ANCHOR_END: static_token_credential

    // ANCHOR: static_token_call
    let token = credential.token().await?;
    println!("token={token:?}");
    let headers = credential.headers().await?;
    println!("headers={headers:?}");
    // ANCHOR_END: static_token_call
    Ok(())
}
// ANCHOR_END: static_token
