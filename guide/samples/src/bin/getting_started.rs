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

// ANCHOR: all
use token_credential::credential::TokenCredential;
use token_credential::options::RefreshOptions;
use token_credential::refresher::RefreshResult;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let credential = TokenCredential::with_options(
        RefreshOptions::new()
            .with_refresher(|| async {
                RefreshResult::Ok(Some(user_guide_samples::fake_token_service(3600)))
            })
            .with_proactive_refresh(true),
    )?;

    let headers = credential.headers().await?;
    println!("headers={headers:?}");
    println!("next refresh at {:?}", credential.next_fetch_at());

    credential.close();
    Ok(())
}
// ANCHOR_END: all
