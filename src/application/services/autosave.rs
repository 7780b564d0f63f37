//! Timed auto-save with cancel-on-shutdown semantics

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;

use crate::application::services::ActivityTracker;
use crate::domain::traits::KeyValueStore;

/// Background task that persists the tracker on a fixed interval.
///
/// `shutdown()` cancels the loop, runs one final save, and joins the task,
/// so no save can run after teardown completes. Save failures are logged
/// and swallowed; the in-memory state stays authoritative until the next
/// successful save.
pub struct AutosaveTask {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl AutosaveTask {
    pub fn spawn(
        tracker: Arc<RwLock<ActivityTracker>>,
        store: Arc<dyn KeyValueStore>,
        interval: Duration,
    ) -> Self {
        let shutdown = Arc::new(Notify::new());
        let notify = shutdown.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first interval tick completes immediately; skip it so the
            // first save happens one full interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = tracker.write().await.save(store.as_ref()).await {
                            tracing::error!("Auto-save failed: {}", e);
                        }
                    }
                    _ = notify.notified() => {
                        if let Err(e) = tracker.write().await.save(store.as_ref()).await {
                            tracing::error!("Final save on shutdown failed: {}", e);
                        } else {
                            tracing::info!("Final save completed");
                        }
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Stop the loop, run the final save, and wait for the task to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.handle.await {
            tracing::warn!("Auto-save task did not exit cleanly: {}", e);
        }
    }
}
