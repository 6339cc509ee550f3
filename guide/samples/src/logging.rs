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

// ANCHOR: logging
pub async fn sample() -> anyhow::Result<()> {
    // ANCHOR: logging_use
    use token_credential::credential::TokenCredential;
    use token_credential::options::RefreshOptions;
    use token_credential::refresher::RefreshResult;
    use tracing_subscriber;
    // ANCHOR_END: logging_use

    // ANCHOR: logging_init
    // Returns an error if the application already installed a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
    // ANCHOR_END: logging_init

    // ANCHOR: logging_call
    let credential = TokenCredential::with_options(
        RefreshOptions::new()
            .with_refresher(|| async { RefreshResult::Ok(Some(crate::fake_token_service(3600))) })
            .with_proactive_refresh(true),
    )?;
    // The first request calls the refresher, and schedules the next refresh.
    let _token = credential.token().await?;
    credential.close();
    // ANCHOR_END: logging_call
    Ok(())
}
// ANCHOR_END: logging
