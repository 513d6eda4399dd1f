// ABOUTME: Storage contract for API tokens
// ABOUTME: Async trait implemented by the SQLite store and wrapped by the timing decorator

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flagpost_storage::StorageResult;

use crate::api_tokens::types::{ApiToken, ApiTokenCreate};

/// Durable record of issued API tokens.
///
/// Reads never fail on absence except [`get`](ApiTokenStore::get); the only
/// mutation that reports a missing token is
/// [`set_expiry`](ApiTokenStore::set_expiry). Infrastructure failures surface
/// as `StorageError::Sqlx` so callers can decide on retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiTokenStore: Send + Sync {
    /// Issue a token. Fails with `StorageError::Conflict` if the secret is taken.
    async fn create(&self, token: ApiTokenCreate) -> StorageResult<ApiToken>;

    /// Number of stored tokens, expired ones included
    async fn count(&self) -> StorageResult<i64>;

    async fn get_all(&self) -> StorageResult<Vec<ApiToken>>;

    /// Tokens without an expiry or expiring strictly after now
    async fn get_active(&self) -> StorageResult<Vec<ApiToken>> {
        self.get_active_at(Utc::now()).await
    }

    /// Same as [`get_active`](ApiTokenStore::get_active), evaluated at `now`
    async fn get_active_at(&self, now: DateTime<Utc>) -> StorageResult<Vec<ApiToken>>;

    /// Fails with `StorageError::NotFound` when no token has this secret
    async fn get(&self, secret: &str) -> StorageResult<ApiToken>;

    async fn exists(&self, secret: &str) -> StorageResult<bool>;

    /// Replace the expiry of an existing token and return the updated record
    async fn set_expiry(&self, secret: &str, expires_at: DateTime<Utc>)
        -> StorageResult<ApiToken>;

    /// Deleting an unknown secret is not an error
    async fn delete(&self, secret: &str) -> StorageResult<()>;

    async fn delete_all(&self) -> StorageResult<()>;

    /// Stamp `seen_at` for every listed secret. Best effort: failures are
    /// logged by the implementation and never returned.
    async fn mark_seen_at(&self, secrets: &HashSet<String>);
}
