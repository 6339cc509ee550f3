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

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

type OnFire = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A single-shot timer that can be rescheduled and cancelled.
///
/// When the timer fires it runs `on_fire` once. The callback is expected to
/// reschedule the task if another firing is needed. A firing that is in
/// progress always runs to completion, cancelling or rescheduling the task
/// only affects the next firing.
///
/// The task does not own whatever `on_fire` refreshes. Callers should capture
/// weak references in the callback.
///
/// Dropping the task cancels it.
pub(crate) struct FetchingTask {
    runtime: Handle,
    on_fire: OnFire,
    timer: Option<Timer>,
}

struct Timer {
    at: Instant,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl Timer {
    fn arm(runtime: &Handle, at: Instant, on_fire: OnFire) -> Self {
        let shutdown = CancellationToken::new();
        let cancelled = shutdown.clone();
        let handle = runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {},
                _ = tokio::time::sleep_until(at) => {
                    // The other branch is dropped here, a cancellation while
                    // firing does not interrupt the callback.
                    on_fire().await;
                },
            }
        });
        Self {
            at,
            shutdown,
            handle,
        }
    }

    fn disarm(&self) {
        self.shutdown.cancel();
    }
}

impl FetchingTask {
    /// Arms the timer to fire at `at`, running on `runtime`.
    ///
    /// If `at` is in the past the timer fires as soon as the runtime polls it.
    pub(crate) fn start<F>(runtime: &Handle, at: Instant, on_fire: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let on_fire: OnFire = Arc::new(on_fire);
        tracing::debug!("scheduling token fetch in {:?}", at - Instant::now());
        Self {
            timer: Some(Timer::arm(runtime, at, on_fire.clone())),
            runtime: runtime.clone(),
            on_fire,
        }
    }

    /// Disarms the current timer (if any) and arms a new one for `at`.
    ///
    /// Has no effect once the task is cancelled.
    pub(crate) fn reschedule(&mut self, at: Instant) {
        let Some(previous) = self.timer.take() else {
            return;
        };
        previous.disarm();
        tracing::debug!("rescheduling token fetch in {:?}", at - Instant::now());
        self.timer = Some(Timer::arm(&self.runtime, at, self.on_fire.clone()));
    }

    /// Disarms the timer. Calling this more than once has no effect.
    pub(crate) fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            tracing::debug!("cancelling token fetch");
            timer.disarm();
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.timer.is_none()
    }

    /// The instant the timer is armed for.
    ///
    /// Returns `None` once the task is cancelled, or after the timer has fired
    /// and the callback did not reschedule it.
    pub(crate) fn next_fetch_at(&self) -> Option<Instant> {
        self.timer
            .as_ref()
            .filter(|t| !t.handle.is_finished())
            .map(|t| t.at)
    }
}

impl Drop for FetchingTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for FetchingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchingTask")
            .field("next_fetch_at", &self.next_fetch_at())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
