// ABOUTME: Error types shared by every storage layer
// ABOUTME: Separates caller errors (conflict, not found) from infrastructure failures

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Record already exists: {0}")]
    Conflict(String),
    #[error("Could not find api-token")]
    NotFound,
    #[error("Invalid stored value: {0}")]
    InvalidFormat(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Convert an insert failure, reporting uniqueness violations as `Conflict`
    pub fn from_insert(err: sqlx::Error, key: &str) -> Self {
        if is_unique_violation(&err) {
            StorageError::Conflict(key.to_string())
        } else {
            StorageError::Sqlx(err)
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Sqlx(_) | StorageError::Io(_))
    }
}

// SQLITE_CONSTRAINT_PRIMARYKEY = 1555, SQLITE_CONSTRAINT_UNIQUE = 2067
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || matches!(db_err.code().as_deref(), Some("1555") | Some("2067"))
                || db_err.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_a_conflict() {
        let err = StorageError::from_insert(sqlx::Error::RowNotFound, "abc");
        assert!(matches!(err, StorageError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::Sqlx(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!StorageError::NotFound.is_transient());
        assert!(!StorageError::Conflict("abc".to_string()).is_transient());
        assert!(!StorageError::InvalidFormat("type".to_string()).is_transient());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(StorageError::NotFound.to_string(), "Could not find api-token");
    }
}
