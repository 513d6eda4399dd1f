// ABOUTME: Batches recently used token secrets for the liveness sweep
// ABOUTME: Authentication records secrets in memory; a background task flushes them via mark_seen_at

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::api_tokens::storage::ApiTokenStore;

pub struct LastSeenTracker {
    store: Arc<dyn ApiTokenStore>,
    pending: Mutex<HashSet<String>>,
}

impl LastSeenTracker {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(store: Arc<dyn ApiTokenStore>) -> Self {
        Self {
            store,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Note that a secret was just presented for authentication
    pub async fn record(&self, secret: impl Into<String>) {
        self.pending.lock().await.insert(secret.into());
    }

    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Write every pending secret in one batch. Returns how many were flushed.
    pub async fn flush(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock().await);
        if batch.is_empty() {
            return 0;
        }

        self.store.mark_seen_at(&batch).await;
        debug!(count = batch.len(), "Flushed api token last-seen batch");
        batch.len()
    }

    /// Flush on a fixed interval until the returned handle is aborted
    pub fn spawn(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        info!(interval_secs = every.as_secs(), "Api token last-seen sweep started");

        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.flush().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_tokens::storage::MockApiTokenStore;
    use std::sync::Mutex as StdMutex;

    fn recording_store() -> (MockApiTokenStore, Arc<StdMutex<Vec<HashSet<String>>>>) {
        let batches = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&batches);

        let mut mock = MockApiTokenStore::new();
        mock.expect_mark_seen_at().returning(move |secrets| {
            sink.lock().unwrap().push(secrets.clone());
        });

        (mock, batches)
    }

    #[tokio::test]
    async fn test_flush_sends_one_deduplicated_batch() {
        let (mock, batches) = recording_store();
        let tracker = LastSeenTracker::new(Arc::new(mock));

        tracker.record("s1").await;
        tracker.record("s2").await;
        tracker.record("s1".to_string()).await;
        assert_eq!(tracker.pending().await, 2);

        assert_eq!(tracker.flush().await, 2);
        assert_eq!(tracker.pending().await, 0);

        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            HashSet::from(["s1".to_string(), "s2".to_string()])
        );
    }

    #[tokio::test]
    async fn test_flush_with_nothing_pending_skips_the_store() {
        let mut mock = MockApiTokenStore::new();
        mock.expect_mark_seen_at().times(0);

        let tracker = LastSeenTracker::new(Arc::new(mock));
        assert_eq!(tracker.flush().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweep_flushes_on_interval() {
        let (mock, batches) = recording_store();
        let tracker = Arc::new(LastSeenTracker::new(Arc::new(mock)));

        tracker.record("abc123").await;
        let handle = Arc::clone(&tracker).spawn(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(batches.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(batches.lock().unwrap().len(), 1);
        assert_eq!(tracker.pending().await, 0);

        handle.abort();
    }
}
