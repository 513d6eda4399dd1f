use flagpost_storage::StorageConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Storage(#[from] flagpost_storage::ConfigError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            storage: StorageConfig::from_env()?,
        })
    }

    /// Apply a `--database` flag on top of the environment
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.storage.database_url = url;
        }
        self
    }
}
