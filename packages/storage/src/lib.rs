// ABOUTME: Data layer and persistence for Flagpost
// ABOUTME: Storage errors plus SQLite pool configuration and bootstrap

pub mod config;
pub mod error;
pub mod pool;

pub use config::{ConfigError, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use pool::{connect, MIGRATOR};
