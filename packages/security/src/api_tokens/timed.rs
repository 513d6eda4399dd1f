// ABOUTME: Timing decorator for any API token store
// ABOUTME: Publishes per-operation database timings without touching store logic

use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flagpost_storage::StorageResult;
use tokio::sync::broadcast;
use tracing::trace;

use crate::api_tokens::storage::ApiTokenStore;
use crate::api_tokens::types::{ApiToken, ApiTokenCreate};

const STORE_NAME: &str = "api-tokens";
const EVENT_CAPACITY: usize = 1024;

/// Wall time spent in one store operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbTimeEvent {
    pub store: &'static str,
    pub action: &'static str,
    pub elapsed: Duration,
}

pub struct TimedApiTokenStore<S> {
    inner: S,
    events: broadcast::Sender<DbTimeEvent>,
}

impl<S: ApiTokenStore> TimedApiTokenStore<S> {
    pub fn new(inner: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { inner, events }
    }

    /// Share an existing event bus with other timed stores
    pub fn with_events(inner: S, events: broadcast::Sender<DbTimeEvent>) -> Self {
        Self { inner, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DbTimeEvent> {
        self.events.subscribe()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn timed<T, F>(&self, action: &'static str, operation: F) -> T
    where
        F: Future<Output = T> + Send,
    {
        let started = Instant::now();
        let output = operation.await;
        let elapsed = started.elapsed();

        trace!(store = STORE_NAME, action, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "db time");

        // No subscribers is fine
        let _ = self.events.send(DbTimeEvent {
            store: STORE_NAME,
            action,
            elapsed,
        });

        output
    }
}

#[async_trait]
impl<S: ApiTokenStore> ApiTokenStore for TimedApiTokenStore<S> {
    async fn create(&self, token: ApiTokenCreate) -> StorageResult<ApiToken> {
        self.timed("create", self.inner.create(token)).await
    }

    async fn count(&self) -> StorageResult<i64> {
        self.timed("count", self.inner.count()).await
    }

    async fn get_all(&self) -> StorageResult<Vec<ApiToken>> {
        self.timed("getAll", self.inner.get_all()).await
    }

    async fn get_active(&self) -> StorageResult<Vec<ApiToken>> {
        self.timed("getActive", self.inner.get_active()).await
    }

    async fn get_active_at(&self, now: DateTime<Utc>) -> StorageResult<Vec<ApiToken>> {
        self.timed("getActive", self.inner.get_active_at(now)).await
    }

    async fn get(&self, secret: &str) -> StorageResult<ApiToken> {
        self.timed("get", self.inner.get(secret)).await
    }

    async fn exists(&self, secret: &str) -> StorageResult<bool> {
        self.timed("exists", self.inner.exists(secret)).await
    }

    async fn set_expiry(
        &self,
        secret: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<ApiToken> {
        self.timed("setExpiry", self.inner.set_expiry(secret, expires_at))
            .await
    }

    async fn delete(&self, secret: &str) -> StorageResult<()> {
        self.timed("delete", self.inner.delete(secret)).await
    }

    async fn delete_all(&self) -> StorageResult<()> {
        self.timed("deleteAll", self.inner.delete_all()).await
    }

    async fn mark_seen_at(&self, secrets: &HashSet<String>) {
        self.timed("markSeenAt", self.inner.mark_seen_at(secrets))
            .await
    }
}
