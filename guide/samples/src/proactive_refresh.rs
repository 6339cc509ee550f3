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

// ANCHOR: proactive_refresh
pub async fn sample() -> anyhow::Result<()> {
    // ANCHOR: proactive_refresh_use
    use std::time::Duration;
    use token_credential::credential::TokenCredential;
    use token_credential::options::RefreshOptions;
    use token_credential::refresher::RefreshResult;
    // ANCHOR_END: proactive_refresh_use

    // ANCHOR: proactive_refresh_credential
    let options = RefreshOptions::new()
        .with_refresher(|| async { RefreshResult::Ok(Some(crate::fake_token_service(3600))) })
        .with_initial_token(crate::fake_token_service(600))
        .with_proactive_refresh(true)
        .with_refresh_offset(Duration::from_secs(120));
    let credential = TokenCredential::with_options(options)?;
    // ANCHOR_END: proactive_refresh_credential

    // ANCHOR: proactive_refresh_call
    let token = credential.token().await?;
    println!("token={token:?}");
    println!("next refresh at {:?}", credential.next_fetch_at());
    // ANCHOR_END: proactive_refresh_call

    // ANCHOR: proactive_refresh_close
    credential.close();
    // ANCHOR_END: proactive_refresh_close
    Ok(())
}
// ANCHOR_END: proactive_refresh
