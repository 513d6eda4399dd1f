// ABOUTME: SQLite implementation of the API token store
// ABOUTME: Wildcard scopes map to NULL columns; timestamps are INTEGER microseconds since the epoch

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use flagpost_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, error};

use crate::api_tokens::storage::ApiTokenStore;
use crate::api_tokens::types::{ApiToken, ApiTokenCreate, ApiTokenType, TokenScope};

const TOKEN_COLUMNS: &str =
    "secret, username, type, project, environment, created_at, expires_at, seen_at";

/// Upper bound on bound parameters per `IN (...)` list
const SEEN_AT_CHUNK_SIZE: usize = 500;

/// Stored instants keep microsecond precision; finer digits are truncated.
pub struct SqliteApiTokenStore {
    pool: SqlitePool,
}

impl SqliteApiTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn update_seen_at(
        &self,
        secrets: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> StorageResult<u64> {
        let seen_at = encode_timestamp(&now);
        let secrets: Vec<&str> = secrets.iter().map(String::as_str).collect();

        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for chunk in secrets.chunks(SEEN_AT_CHUNK_SIZE) {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("UPDATE api_tokens SET seen_at = ");
            query_builder.push_bind(seen_at);
            query_builder.push(" WHERE secret IN (");

            let mut separated = query_builder.separated(", ");
            for secret in chunk {
                separated.push_bind(*secret);
            }
            separated.push_unseparated(")");

            let result = query_builder.build().execute(&mut *tx).await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }
}

#[async_trait]
impl ApiTokenStore for SqliteApiTokenStore {
    async fn create(&self, token: ApiTokenCreate) -> StorageResult<ApiToken> {
        debug!(secret = %redact(&token.secret), token_type = %token.token_type, "Creating api token");

        let created_at = stored_precision(Utc::now());
        let token = ApiTokenCreate {
            expires_at: token.expires_at.map(stored_precision),
            ..token
        };

        sqlx::query(
            r#"
            INSERT INTO api_tokens (secret, username, type, project, environment, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token.secret)
        .bind(&token.username)
        .bind(token.token_type.as_str())
        .bind(token.project.to_column())
        .bind(token.environment.to_column())
        .bind(encode_timestamp(&created_at))
        .bind(token.expires_at.as_ref().map(encode_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_insert(e, &redact(&token.secret)))?;

        Ok(token.into_token(created_at))
    }

    async fn count(&self) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_all(&self) -> StorageResult<Vec<ApiToken>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens ORDER BY created_at, secret"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_token).collect()
    }

    async fn get_active_at(&self, now: DateTime<Utc>) -> StorageResult<Vec<ApiToken>> {
        // One instant for every row
        let rows = sqlx::query(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens
             WHERE expires_at IS NULL OR expires_at > ?
             ORDER BY created_at, secret"
        ))
        .bind(encode_timestamp(&now))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_token).collect()
    }

    async fn get(&self, secret: &str) -> StorageResult<ApiToken> {
        let row = sqlx::query(&format!(
            "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE secret = ?"
        ))
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_token(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn exists(&self, secret: &str) -> StorageResult<bool> {
        let present: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM api_tokens WHERE secret = ?)")
                .bind(secret)
                .fetch_one(&self.pool)
                .await?;
        Ok(present != 0)
    }

    async fn set_expiry(
        &self,
        secret: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<ApiToken> {
        debug!(secret = %redact(secret), %expires_at, "Setting api token expiry");

        let row = sqlx::query(&format!(
            "UPDATE api_tokens SET expires_at = ? WHERE secret = ? RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(encode_timestamp(&expires_at))
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_token(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn delete(&self, secret: &str) -> StorageResult<()> {
        debug!(secret = %redact(secret), "Deleting api token");

        sqlx::query("DELETE FROM api_tokens WHERE secret = ?")
            .bind(secret)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM api_tokens")
            .execute(&self.pool)
            .await?;
        debug!(deleted = result.rows_affected(), "Deleted all api tokens");
        Ok(())
    }

    async fn mark_seen_at(&self, secrets: &HashSet<String>) {
        if secrets.is_empty() {
            return;
        }

        let now = Utc::now();
        match self.update_seen_at(secrets, now).await {
            Ok(updated) => debug!(requested = secrets.len(), updated, "Updated api token seen_at"),
            Err(e) => error!(error = %e, requested = secrets.len(), "Could not update lastSeen"),
        }
    }
}

/// Whole microseconds since the epoch. Covers every `DateTime<Utc>` and
/// compares numerically in SQL.
fn encode_timestamp(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_micros()
}

/// The instant as it reads back after a round trip through the table
fn stored_precision(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(6)
}

fn decode_timestamp(column: &str, value: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(value)
        .ok_or_else(|| StorageError::InvalidFormat(format!("{column} {value} is out of range")))
}

fn decode_optional_timestamp(
    row: &SqliteRow,
    column: &str,
) -> StorageResult<Option<DateTime<Utc>>> {
    let value: Option<i64> = row.try_get(column)?;
    value.map(|value| decode_timestamp(column, value)).transpose()
}

fn row_to_token(row: &SqliteRow) -> StorageResult<ApiToken> {
    let token_type: String = row.try_get("type")?;
    let created_at: i64 = row.try_get("created_at")?;

    Ok(ApiToken {
        secret: row.try_get("secret")?,
        username: row.try_get("username")?,
        token_type: token_type
            .parse::<ApiTokenType>()
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))?,
        project: TokenScope::from_column(row.try_get("project")?),
        environment: TokenScope::from_column(row.try_get("environment")?),
        created_at: decode_timestamp("created_at", created_at)?,
        expires_at: decode_optional_timestamp(row, "expires_at")?,
        seen_at: decode_optional_timestamp(row, "seen_at")?,
    })
}

/// Secrets are credentials: log only a short prefix
pub(crate) fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}***")
}
