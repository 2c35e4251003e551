//! File-record repository for SQLite operations
//!
//! Persists metadata for uploaded files. All access to the `file_records`
//! table goes through these functions; byte content lives in the file cache
//! under the same id.

use sqlx::SqlitePool;

use crate::data::sqlite::StoreError;
use crate::data::types::{FilePurpose, FileRecord};

type FileRow = (String, String, i64, String, i64, i64, String);

fn decode_row(row: FileRow) -> Result<FileRecord, sqlx::Error> {
    let (id, filename, bytes, purpose, created_at, expiration, content_type) = row;
    let purpose: FilePurpose = purpose
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(e.into()))?;
    Ok(FileRecord {
        id,
        filename,
        bytes,
        purpose,
        created_at,
        expiration,
        content_type,
    })
}

/// Insert a new file record
///
/// Fails with `DuplicateId` if the id already exists. Ids carry enough
/// entropy that collisions are not expected in practice.
pub async fn insert(pool: &SqlitePool, record: &FileRecord) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        INSERT INTO file_records (id, filename, bytes, purpose, created_at, expiration, content_type)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.filename)
    .bind(record.bytes)
    .bind(record.purpose.as_str())
    .bind(record.created_at)
    .bind(record.expiration)
    .bind(&record.content_type)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(StoreError::DuplicateId(record.id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Get a file record by id, regardless of expiration
pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<FileRecord>, StoreError> {
    let row = sqlx::query_as::<_, FileRow>(
        r#"
        SELECT id, filename, bytes, purpose, created_at, expiration, content_type
        FROM file_records
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(decode_row).transpose().map_err(StoreError::from)
}

/// Get a file record by id, requiring `expiration > now`
pub async fn get_unexpired(
    pool: &SqlitePool,
    id: &str,
    now: i64,
) -> Result<Option<FileRecord>, StoreError> {
    let row = sqlx::query_as::<_, FileRow>(
        r#"
        SELECT id, filename, bytes, purpose, created_at, expiration, content_type
        FROM file_records
        WHERE id = ? AND expiration > ?
        "#,
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    row.map(decode_row).transpose().map_err(StoreError::from)
}

/// Delete a file record regardless of expiration
///
/// Returns whether a record was removed.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM file_records WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List all records with `expiration < now`, oldest first
pub async fn list_expired(pool: &SqlitePool, now: i64) -> Result<Vec<FileRecord>, StoreError> {
    let rows = sqlx::query_as::<_, FileRow>(
        r#"
        SELECT id, filename, bytes, purpose, created_at, expiration, content_type
        FROM file_records
        WHERE expiration < ?
        ORDER BY expiration ASC
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| decode_row(row).map_err(StoreError::from))
        .collect()
}
