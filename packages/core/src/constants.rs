use std::env;
use std::path::PathBuf;

/// Overrides the data directory (defaults to `~/.flagpost`)
pub const ENV_HOME: &str = "FLAGPOST_HOME";

/// Full database URL, e.g. `sqlite:/var/lib/flagpost/flagpost.db`
pub const ENV_DATABASE_URL: &str = "FLAGPOST_DATABASE_URL";

pub const ENV_DB_MAX_CONNECTIONS: &str = "FLAGPOST_DB_MAX_CONNECTIONS";
pub const ENV_DB_BUSY_TIMEOUT: &str = "FLAGPOST_DB_BUSY_TIMEOUT";
pub const ENV_DB_WAL: &str = "FLAGPOST_DB_WAL";

pub const DATABASE_FILE_NAME: &str = "flagpost.db";

/// Get the path to the Flagpost directory (~/.flagpost)
pub fn flagpost_dir() -> PathBuf {
    if let Ok(dir) = env::var(ENV_HOME) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    // HOME first (useful for tests), then the dirs crate
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".flagpost")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".flagpost")
    }
}

/// Get the path to the database file (~/.flagpost/flagpost.db)
pub fn database_file() -> PathBuf {
    flagpost_dir().join(DATABASE_FILE_NAME)
}

/// SQLite URL for the default database file
pub fn default_database_url() -> String {
    format!("sqlite:{}", database_file().display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_flagpost_home_overrides_data_dir() {
        env::set_var(ENV_HOME, "/tmp/flagpost-test-home");

        assert_eq!(flagpost_dir(), PathBuf::from("/tmp/flagpost-test-home"));
        assert_eq!(
            database_file(),
            PathBuf::from("/tmp/flagpost-test-home/flagpost.db")
        );
        assert_eq!(
            default_database_url(),
            "sqlite:/tmp/flagpost-test-home/flagpost.db"
        );

        env::remove_var(ENV_HOME);
    }

    #[test]
    #[serial]
    fn test_empty_flagpost_home_is_ignored() {
        let previous_home = env::var("HOME").ok();
        env::set_var(ENV_HOME, "");
        env::set_var("HOME", "/home/tester");

        assert_eq!(flagpost_dir(), PathBuf::from("/home/tester/.flagpost"));

        env::remove_var(ENV_HOME);
        match previous_home {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }
    }
}
