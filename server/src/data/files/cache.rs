//! Byte cache for uploaded files
//!
//! A flat directory of raw file bytes keyed strictly by generated file id.
//! User-supplied filenames never reach the filesystem, so path traversal is
//! impossible by construction. The cache is always kept in lockstep with the
//! metadata store: bytes are written before the record is committed and the
//! record is deleted before the bytes are removed.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::FileCacheError;

/// Filesystem byte cache keyed by file id
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at the given directory
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Location of an entry's bytes (whether or not it exists)
    pub fn path(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }

    /// Stream bytes into the cache under the given id
    ///
    /// Creates the cache directory if absent and consumes the input in
    /// bounded chunks. Returns the total number of bytes written. A partial
    /// file left by a mid-stream failure is removed before the error is
    /// returned.
    pub async fn write<S>(&self, id: &str, stream: S) -> Result<u64, FileCacheError>
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
    {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path(id);

        match Self::write_chunks(&path, stream).await {
            Ok(written) => Ok(written),
            Err(e) => {
                let _ = fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    async fn write_chunks<S>(path: &Path, mut stream: S) -> Result<u64, FileCacheError>
    where
        S: Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
    {
        let mut file = fs::File::create(path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.try_next().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }

    /// Whether bytes exist for the id
    pub fn exists(&self, id: &str) -> bool {
        self.path(id).exists()
    }

    /// Remove an entry's bytes
    ///
    /// Idempotent: an already-absent entry is success.
    pub async fn remove(&self, id: &str) -> Result<(), FileCacheError> {
        match fs::remove_file(self.path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
