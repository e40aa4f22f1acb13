//! Response store backed by a single SQLite file.

use crate::config::Config;
use crate::domain::{NewResponse, ResponseRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Open(sqlx::Error),
    #[error("failed to write response: {0}")]
    Write(sqlx::Error),
    #[error("failed to commit response: {0}")]
    Commit(sqlx::Error),
    #[error("failed to read responses: {0}")]
    Read(sqlx::Error),
}

/// Store for submitted responses.
///
/// Holds no live connection: every operation opens its own connection and
/// closes it before returning, on success and failure alike.
#[derive(Debug, Clone)]
pub struct ResponseStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl ResponseStore {
    /// Create a store for the database file at `path`.
    ///
    /// The file is created on first connect if it does not exist.
    pub fn new(path: impl AsRef<Path>, busy_timeout: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete)
            .busy_timeout(busy_timeout)
            .disable_statement_logging();
        ResponseStore { path, options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.database_path, config.busy_timeout())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) async fn connect(&self) -> Result<SqliteConnection, sqlx::Error> {
        self.options.connect().await
    }

    /// Insert one response and commit it, returning the assigned id.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the insert or
    /// commit fails. Nothing is visible in the table after a failure.
    pub async fn insert_response(&self, new: &NewResponse) -> Result<i64, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Open)?;
        let result = insert_and_commit(&mut conn, new).await;
        release(conn).await;
        result
    }

    /// Number of stored responses.
    pub async fn count_responses(&self) -> Result<i64, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Open)?;
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM responses")
            .fetch_one(&mut conn)
            .await
            .map_err(StorageError::Read);
        release(conn).await;
        result
    }

    /// All stored responses in id order.
    pub async fn list_responses(&self) -> Result<Vec<ResponseRecord>, StorageError> {
        let mut conn = self.connect().await.map_err(StorageError::Open)?;
        let result = sqlx::query("SELECT id, square_id, response FROM responses ORDER BY id ASC")
            .fetch_all(&mut conn)
            .await
            .map_err(StorageError::Read);
        release(conn).await;

        Ok(result?
            .iter()
            .map(|row| ResponseRecord {
                id: row.get("id"),
                square_id: row.get("square_id"),
                response: row.get("response"),
            })
            .collect())
    }
}

async fn insert_and_commit(
    conn: &mut SqliteConnection,
    new: &NewResponse,
) -> Result<i64, StorageError> {
    let mut tx = conn.begin().await.map_err(StorageError::Write)?;

    let id = sqlx::query("INSERT INTO responses (square_id, response) VALUES (?, ?)")
        .bind(new.square_id.as_str())
        .bind(new.response.as_str())
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Write)?
        .last_insert_rowid();

    // A failed commit drops `tx`, which rolls the insert back.
    tx.commit().await.map_err(StorageError::Commit)?;
    Ok(id)
}

/// Close a connection, logging rather than failing if the close errors.
pub(crate) async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_store(busy_timeout: Duration) -> (ResponseStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ResponseStore::new(temp_dir.path().join("test.db"), busy_timeout);
        store.ensure_schema().await.expect("ensure_schema failed");
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (store, _temp) = setup_store(Duration::from_secs(5)).await;

        let id = store
            .insert_response(&NewResponse::new("A1", "yes"))
            .await
            .unwrap();

        let rows = store.list_responses().await.unwrap();
        assert_eq!(
            rows,
            vec![ResponseRecord {
                id,
                square_id: "A1".to_string(),
                response: "yes".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let (store, _temp) = setup_store(Duration::from_secs(5)).await;

        let first = store
            .insert_response(&NewResponse::new("A1", "yes"))
            .await
            .unwrap();
        let second = store
            .insert_response(&NewResponse::new("A1", "no"))
            .await
            .unwrap();

        assert!(second > first);
        assert_eq!(store.count_responses().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (store, _temp) = setup_store(Duration::from_secs(5)).await;

        let first = store
            .insert_response(&NewResponse::new("C3", "maybe"))
            .await
            .unwrap();

        let mut conn = store.connect().await.unwrap();
        sqlx::query("DELETE FROM responses WHERE id = ?")
            .bind(first)
            .execute(&mut conn)
            .await
            .unwrap();
        release(conn).await;

        let second = store
            .insert_response(&NewResponse::new("C3", "maybe"))
            .await
            .unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_row() {
        let (store, _temp) = setup_store(Duration::ZERO).await;

        // An open read transaction holds a shared lock, so the writer can
        // insert but cannot take the exclusive lock needed to commit.
        let mut reader = store.connect().await.unwrap();
        let mut read_tx = reader.begin().await.unwrap();
        let before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses")
            .fetch_one(&mut *read_tx)
            .await
            .unwrap();
        assert_eq!(before, 0);

        let err = store
            .insert_response(&NewResponse::new("A1", "yes"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Commit(_)), "got {:?}", err);

        read_tx.commit().await.unwrap();
        release(reader).await;

        let patient = ResponseStore::new(store.path(), Duration::from_secs(5));
        assert_eq!(patient.count_responses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_without_schema_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResponseStore::new(temp_dir.path().join("bare.db"), Duration::from_secs(5));

        let err = store
            .insert_response(&NewResponse::new("A1", "yes"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Write(_)), "got {:?}", err);
    }
}
