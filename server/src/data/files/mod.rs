//! Ephemeral file lifecycle
//!
//! Uploaded files are time-bounded cache entries: metadata lives in the
//! SQLite store, bytes live in the id-keyed file cache, and the two are
//! created and deleted together. An expiry sweeper removes entries past
//! their retention window.
//!
//! - `cache` - id-keyed byte storage on the local filesystem
//! - `sweeper` - periodic expiry sweep task
//! - `error` - error types for file operations

pub mod cache;
pub mod error;
pub mod sweeper;

use std::path::PathBuf;

use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use sqlx::SqlitePool;

pub use cache::FileCache;
pub use error::{FileCacheError, FilesError};

use crate::data::sqlite::repositories::file as file_repo;
use crate::data::types::{generate_file_id, FilePurpose, FileRecord};

/// Files service orchestrating the metadata store and the byte cache
///
/// All access to records and bytes is mediated here so the
/// metadata-iff-bytes invariant cannot be violated by concurrent callers:
/// bytes are fully written before a record is committed, and a record is
/// deleted before its bytes are removed.
pub struct FileService {
    pool: SqlitePool,
    cache: FileCache,
    retention_secs: i64,
}

impl FileService {
    pub fn new(pool: SqlitePool, cache: FileCache, retention_hours: i64) -> Self {
        Self {
            pool,
            cache,
            retention_secs: retention_hours * 3600,
        }
    }

    /// Stage an uploaded file: write bytes, then commit metadata
    ///
    /// The recorded size is the byte count actually written, not any
    /// client-declared value. If byte writing fails no record is created;
    /// if the metadata commit fails the just-written bytes are removed.
    pub async fn upload<S>(
        &self,
        stream: S,
        filename: &str,
        content_type: &str,
        purpose: &str,
    ) -> Result<FileRecord, FilesError>
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
    {
        let purpose: FilePurpose = purpose
            .parse()
            .map_err(|_: String| FilesError::InvalidPurpose(purpose.to_string()))?;

        let id = generate_file_id();
        tracing::info!(filename, content_type, purpose = %purpose, "Start uploading file");

        let written = self.cache.write(&id, stream).await?;

        let now = Utc::now().timestamp();
        let record = FileRecord {
            id,
            filename: filename.to_string(),
            bytes: written as i64,
            purpose,
            created_at: now,
            expiration: now + self.retention_secs,
            content_type: content_type.to_string(),
        };

        if let Err(e) = file_repo::insert(&self.pool, &record).await {
            if let Err(remove_err) = self.cache.remove(&record.id).await {
                tracing::warn!(
                    id = %record.id,
                    error = %remove_err,
                    "Failed to remove bytes after metadata commit failure"
                );
            }
            return Err(e.into());
        }

        tracing::info!(filename, id = %record.id, bytes = record.bytes, "Finish uploading file");
        Ok(record)
    }

    /// Retrieve metadata for an unexpired file
    ///
    /// The byte-presence check closes the deletion race window: a record
    /// can trail its bytes only while a delete or sweep is in flight.
    pub async fn get_metadata(&self, id: &str) -> Result<FileRecord, FilesError> {
        let now = Utc::now().timestamp();
        let record = file_repo::get_unexpired(&self.pool, id, now)
            .await?
            .ok_or_else(|| FilesError::NotFound(id.to_string()))?;

        if !self.cache.exists(id) {
            return Err(FilesError::NotFound(id.to_string()));
        }

        Ok(record)
    }

    /// Locate the cached bytes of an unexpired file for streaming
    pub async fn content_path(&self, id: &str) -> Result<(PathBuf, FileRecord), FilesError> {
        let record = self.get_metadata(id).await?;
        Ok((self.cache.path(id), record))
    }

    /// Delete a file by id
    ///
    /// Expiration is intentionally not checked: an expired-but-unswept
    /// record can still be deleted. Metadata goes first, then bytes.
    pub async fn delete(&self, id: &str) -> Result<(), FilesError> {
        if file_repo::get(&self.pool, id).await?.is_none() {
            return Err(FilesError::NotFound(id.to_string()));
        }

        tracing::info!(id, "Deleting file");
        file_repo::delete(&self.pool, id).await?;
        self.cache.remove(id).await?;

        Ok(())
    }

    /// Listing uploaded files is an intentional product omission
    pub fn list(&self) -> Result<Vec<FileRecord>, FilesError> {
        Err(FilesError::NotImplemented("List files api"))
    }

    /// Delete every record (and its bytes) past its expiration
    ///
    /// Metadata deletion is committed per record before byte removal is
    /// attempted, so a crash mid-sweep leaves at most orphaned bytes, never
    /// a dangling record surviving past the next sweep. A byte-removal
    /// failure for one record does not abort the sweep for the rest.
    pub async fn sweep_expired(&self) -> Result<u64, FilesError> {
        let now = Utc::now().timestamp();
        let expired = file_repo::list_expired(&self.pool, now).await?;

        let mut swept = 0u64;
        for record in expired {
            if let Err(e) = file_repo::delete(&self.pool, &record.id).await {
                tracing::warn!(id = %record.id, error = %e, "Failed to delete expired record");
                continue;
            }
            swept += 1;

            if let Err(e) = self.cache.remove(&record.id).await {
                tracing::warn!(id = %record.id, error = %e, "Failed to remove expired file bytes");
            }
        }

        if swept > 0 {
            tracing::info!(swept, "Expired file sweep complete");
        }
        Ok(swept)
    }
}
