// ABOUTME: Database configuration for the SQLite pool
// ABOUTME: Defaults under the data directory, overridable through FLAGPOST_* environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use flagpost_core::{
    default_database_url, ENV_DATABASE_URL, ENV_DB_BUSY_TIMEOUT, ENV_DB_MAX_CONNECTIONS,
    ENV_DB_WAL,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
    pub enable_wal: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: 10,
            busy_timeout_seconds: 30,
            enable_wal: true,
        }
    }
}

impl StorageConfig {
    /// Single-connection in-memory database, used by tests and dry runs
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            busy_timeout_seconds: 30,
            enable_wal: false,
        }
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = env::var(ENV_DATABASE_URL)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.database_url);

        let max_connections = parse_env(ENV_DB_MAX_CONNECTIONS, defaults.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::Zero(ENV_DB_MAX_CONNECTIONS));
        }

        let busy_timeout_seconds = parse_env(ENV_DB_BUSY_TIMEOUT, defaults.busy_timeout_seconds)?;
        let enable_wal = parse_env(ENV_DB_WAL, defaults.enable_wal)?;

        Ok(Self {
            database_url,
            max_connections,
            busy_timeout_seconds,
            enable_wal,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Filesystem path of the database, if the URL points at a file
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }

        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);

        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue {
                    name,
                    value: value.clone(),
                })
        }
        _ => Ok(default),
    }
}
