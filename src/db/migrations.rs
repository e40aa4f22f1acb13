//! Database schema initialization.

use crate::db::repo::{release, ResponseStore};
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageInitError {
    #[error("failed to create database directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open database: {0}")]
    Open(sqlx::Error),
    #[error("failed to apply schema: {0}")]
    Schema(sqlx::Error),
}

impl ResponseStore {
    /// Create the `responses` table if it does not exist yet.
    ///
    /// Safe to call any number of times; existing rows are untouched. Creates
    /// the database file (and its parent directories) when absent.
    pub async fn ensure_schema(&self) -> Result<(), StorageInitError> {
        if let Some(parent) = self.path().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageInitError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut conn = self.connect().await.map_err(StorageInitError::Open)?;
        let result = run_migrations(&mut conn).await;
        release(conn).await;
        result?;

        info!("Database initialized successfully at {}", self.path().display());
        Ok(())
    }
}

async fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StorageInitError> {
    info!("Running database migrations...");
    let schema_sql = include_str!("schema.sql");

    let mut tx = conn.begin().await.map_err(StorageInitError::Schema)?;
    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed)
                .execute(&mut *tx)
                .await
                .map_err(StorageInitError::Schema)?;
        }
    }
    tx.commit().await.map_err(StorageInitError::Schema)?;

    info!("Migrations completed successfully");
    Ok(())
}
