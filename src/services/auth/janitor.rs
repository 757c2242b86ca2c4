//! Validation-cache janitor background task.
//!
//! Periodically purges expired entries from the [`LocalValidationCache`] so that
//! tokens which are never presented again do not accumulate. Correctness does not
//! depend on it: lookups already refuse expired entries.
//!
//! # Graceful Shutdown
//!
//! The task is bound to a cancellation token. Cancelling it lets the current
//! sweep finish and then ends the task; [`JanitorHandle::shutdown`] does both and
//! waits for the task to exit.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::services::auth::local_cache::LocalValidationCache;

/// Default sweep interval in seconds (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 600;

/// Handle to a running janitor.
#[derive(Debug)]
pub struct JanitorHandle {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl JanitorHandle {
    /// Signal the janitor to stop and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(target: "media.task.cache_janitor", error = %e, "Cache janitor task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the janitor onto the current runtime.
///
/// The task also stops when `cancel_token` (or a parent token) is cancelled
/// from elsewhere.
pub fn spawn_janitor(
    cache: Arc<LocalValidationCache>,
    interval: Duration,
    cancel_token: CancellationToken,
) -> JanitorHandle {
    let task = tokio::spawn(run_janitor(cache, interval, cancel_token.clone()));
    JanitorHandle { cancel_token, task }
}

#[instrument(skip_all, name = "media.task.cache_janitor")]
async fn run_janitor(
    cache: Arc<LocalValidationCache>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(
        target: "media.task.cache_janitor",
        interval_seconds = interval.as_secs(),
        "Starting cache janitor"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; there is nothing to sweep yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep_once(&cache);
            }
            _ = cancel_token.cancelled() => {
                info!(target: "media.task.cache_janitor", "Cache janitor received shutdown signal, exiting");
                break;
            }
        }
    }
}

/// Run a single sweep against the wall clock.
pub(crate) fn sweep_once(cache: &LocalValidationCache) -> usize {
    let now = chrono::Utc::now().timestamp();
    let purged = cache.sweep(now);

    if purged > 0 {
        info!(
            target: "media.task.cache_janitor",
            purged,
            remaining = cache.len(),
            "Purged expired token cache entries"
        );
    } else {
        debug!(target: "media.task.cache_janitor", remaining = cache.len(), "Nothing to purge");
    }
    purged
}
