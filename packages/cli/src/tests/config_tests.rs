use crate::config::{Config, ConfigError};
use flagpost_core::{ENV_DATABASE_URL, ENV_DB_MAX_CONNECTIONS, ENV_DB_WAL};
use serial_test::serial;
use std::env;

fn clear_env() {
    env::remove_var(ENV_DATABASE_URL);
    env::remove_var(ENV_DB_MAX_CONNECTIONS);
    env::remove_var(ENV_DB_WAL);
}

#[test]
#[serial]
fn test_config_from_env_reads_database_url() {
    clear_env();
    env::set_var(ENV_DATABASE_URL, "sqlite:/tmp/flagpost-config-test.db");

    let config = Config::from_env().unwrap();

    assert_eq!(
        config.storage.database_url,
        "sqlite:/tmp/flagpost-config-test.db"
    );
    assert!(config.storage.enable_wal);

    clear_env();
}

#[test]
#[serial]
fn test_database_flag_overrides_environment() {
    clear_env();
    env::set_var(ENV_DATABASE_URL, "sqlite:/tmp/from-env.db");

    let config = Config::from_env()
        .unwrap()
        .with_database_url(Some("sqlite::memory:".to_string()));
    assert_eq!(config.storage.database_url, "sqlite::memory:");

    let config = Config::from_env().unwrap().with_database_url(None);
    assert_eq!(config.storage.database_url, "sqlite:/tmp/from-env.db");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_storage_setting_is_reported() {
    clear_env();
    env::set_var(ENV_DB_WAL, "sometimes");

    let result = Config::from_env();
    assert!(matches!(result, Err(ConfigError::Storage(_))));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid value for FLAGPOST_DB_WAL: sometimes"
    );

    clear_env();
}

#[test]
#[serial]
fn test_zero_connections_rejected() {
    clear_env();
    env::set_var(ENV_DB_MAX_CONNECTIONS, "0");

    let result = Config::from_env();
    assert_eq!(
        result.unwrap_err().to_string(),
        "FLAGPOST_DB_MAX_CONNECTIONS must be greater than zero"
    );

    clear_env();
}
