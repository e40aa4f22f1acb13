//! Database module for SQLite operations.
//!
//! This module provides:
//! - Schema initialization (`ResponseStore::ensure_schema`)
//! - The response store, which opens one connection per operation

pub mod migrations;
pub mod repo;

pub use migrations::StorageInitError;
pub use repo::{ResponseStore, StorageError};
