// ABOUTME: API token lifecycle for Flagpost
// ABOUTME: Stores long-lived bearer tokens scoped to a project and environment

pub mod api_tokens;

// Re-export main types for convenience
pub use api_tokens::{
    ApiToken, ApiTokenCreate, ApiTokenStore, ApiTokenType, DbTimeEvent, LastSeenTracker,
    SqliteApiTokenStore, TimedApiTokenStore, TokenScope, ALL,
};
pub use flagpost_storage::{StorageError, StorageResult};
