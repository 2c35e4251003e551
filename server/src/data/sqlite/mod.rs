//! SQLite database service
//!
//! Centralized database management for the file-record metadata store:
//! - WAL mode for concurrent reads during writes
//! - In-memory temp storage for fast queries
//! - Schema applied idempotently at startup

pub mod error;
pub mod repositories;
pub mod schema;

pub use error::StoreError;
pub use sqlx::SqlitePool;

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_DB_FILENAME, SQLITE_MAX_CONNECTIONS,
};
use crate::core::storage::{AppStorage, DataSubdir};

/// SQLite database service
///
/// Handles database initialization and connection pooling. Created once at
/// server startup and shared across all modules.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Initialize the database service
    ///
    /// Creates the database file if it doesn't exist, configures connection
    /// options with optimized pragmas, and applies the schema.
    pub async fn init(storage: &AppStorage) -> Result<Self, StoreError> {
        let db_path = storage.subdir(DataSubdir::Sqlite).join(SQLITE_DB_FILENAME);

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        Self::apply_schema(&pool).await?;

        tracing::debug!(path = %db_path.display(), "SqliteService initialized");
        Ok(Self { pool })
    }

    /// Apply the schema statements idempotently
    pub async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        for statement in schema::SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement.trim()).execute(pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
