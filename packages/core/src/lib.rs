// ABOUTME: Core constants and paths for Flagpost
// ABOUTME: Foundational package shared by every other Flagpost package

pub mod constants;

// Re-export constants
pub use constants::{
    database_file, default_database_url, flagpost_dir, DATABASE_FILE_NAME, ENV_DATABASE_URL,
    ENV_DB_BUSY_TIMEOUT, ENV_DB_MAX_CONNECTIONS, ENV_DB_WAL, ENV_HOME,
};
