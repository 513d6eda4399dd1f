// ABOUTME: SQLite connection pool bootstrap
// ABOUTME: Creates the database file, then applies pragmas and embedded migrations

use std::time::Duration;

use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use tracing::{debug, info};

use crate::{StorageConfig, StorageResult};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a pool for the configured database and bring its schema up to date
pub async fn connect(config: &StorageConfig) -> StorageResult<SqlitePool> {
    let in_memory = config.is_in_memory();

    if let Some(path) = config.database_path() {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if !Sqlite::database_exists(&config.database_url).await? {
            debug!("Creating database at: {}", config.database_url);
            Sqlite::create_database(&config.database_url).await?;
        }
    }

    let mut options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds));

    // Each in-memory connection is its own database: keep exactly one alive
    if in_memory {
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options.connect(&config.database_url).await?;

    if config.enable_wal && !in_memory {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    MIGRATOR.run(&pool).await?;

    info!(in_memory, "Database connection established");
    Ok(pool)
}
