// ABOUTME: API token management module
// ABOUTME: The store contract with its SQLite implementation and helpers

pub mod seen;
pub mod sqlite;
pub mod storage;
pub mod timed;
pub mod types;

pub use seen::LastSeenTracker;
pub use sqlite::SqliteApiTokenStore;
pub use storage::ApiTokenStore;
pub use timed::{DbTimeEvent, TimedApiTokenStore};
pub use types::{ApiToken, ApiTokenCreate, ApiTokenType, ParseTokenTypeError, TokenScope, ALL};
