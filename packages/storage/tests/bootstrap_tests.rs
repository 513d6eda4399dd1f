// ABOUTME: Integration tests for pool bootstrap and migrations
// ABOUTME: Checks the on-disk schema and in-memory pool behavior

use flagpost_storage::{connect, StorageConfig};
use sqlx::Row;
use tempfile::TempDir;

#[tokio::test]
async fn test_connect_creates_database_file_and_parent_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("flagpost.db");
    let config = StorageConfig {
        database_url: format!("sqlite:{}", db_path.display()),
        max_connections: 2,
        busy_timeout_seconds: 5,
        enable_wal: true,
    };

    let pool = connect(&config).await.unwrap();

    assert!(db_path.exists());

    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    pool.close().await;
}

#[tokio::test]
async fn test_connect_is_idempotent_on_existing_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("flagpost.db");
    let config = StorageConfig::default().with_database_url(format!("sqlite:{}", db_path.display()));

    let pool = connect(&config).await.unwrap();
    sqlx::query(
        "INSERT INTO api_tokens (secret, username, type, created_at) VALUES ('s', 'u', 'client', 1735689600000000)",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    let pool = connect(&config).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_api_tokens_schema() {
    let pool = connect(&StorageConfig::in_memory()).await.unwrap();

    let columns = sqlx::query("PRAGMA table_info(api_tokens)")
        .fetch_all(&pool)
        .await
        .unwrap();

    let columns: Vec<(String, bool, bool)> = columns
        .iter()
        .map(|row| {
            let name: String = row.get("name");
            let notnull: i64 = row.get("notnull");
            let pk: i64 = row.get("pk");
            (name, notnull != 0, pk != 0)
        })
        .collect();

    assert_eq!(
        columns,
        vec![
            ("secret".to_string(), true, true),
            ("username".to_string(), true, false),
            ("type".to_string(), true, false),
            ("project".to_string(), false, false),
            ("environment".to_string(), false, false),
            ("created_at".to_string(), true, false),
            ("expires_at".to_string(), false, false),
            ("seen_at".to_string(), false, false),
        ]
    );
}

#[tokio::test]
async fn test_timestamp_columns_are_integers() {
    let pool = connect(&StorageConfig::in_memory()).await.unwrap();

    let rows = sqlx::query("PRAGMA table_info(api_tokens)")
        .fetch_all(&pool)
        .await
        .unwrap();

    for row in rows {
        let name: String = row.get("name");
        let column_type: String = row.get("type");
        if name.ends_with("_at") {
            assert_eq!(column_type, "INTEGER", "column {name}");
        }
    }
}

#[tokio::test]
async fn test_in_memory_pool_keeps_its_data() {
    let pool = connect(&StorageConfig::in_memory()).await.unwrap();

    for i in 0..5 {
        sqlx::query(
            "INSERT INTO api_tokens (secret, username, type, created_at) VALUES (?, 'u', 'client', 1735689600000000)",
        )
        .bind(format!("secret-{i}"))
        .execute(&pool)
        .await
        .unwrap();
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 5);
}
