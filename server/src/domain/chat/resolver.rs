//! Image reference resolution
//!
//! Turns an image reference from a chat message into local bytes the model
//! can read. Three mutually exclusive forms, in precedence order: inline
//! base64 data URI, internal file-handle URL (a file previously uploaded to
//! this service), and generic remote URL. Freshly written files always get
//! a randomly generated name, never one derived from content or caller
//! input.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use reqwest::header::CONTENT_TYPE;
use tokio::fs;

use super::error::ResolveError;
use crate::core::constants::FILE_ID_PREFIX;
use crate::data::files::{FileService, FilesError};

/// Resolves image references into local paths
pub struct ImageResolver {
    http: reqwest::Client,
    files: Arc<FileService>,
    scratch_dir: PathBuf,
}

impl ImageResolver {
    pub fn new(
        files: Arc<FileService>,
        scratch_dir: PathBuf,
        download_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()?;
        Ok(Self {
            http,
            files,
            scratch_dir,
        })
    }

    /// Resolve an image reference to a local path
    pub async fn resolve(&self, reference: &str) -> Result<PathBuf, ResolveError> {
        if let Some(rest) = reference.strip_prefix("data:image/") {
            self.resolve_data_uri(rest).await
        } else if let Some(id) = internal_file_id(reference) {
            self.resolve_file_handle(&id).await
        } else {
            self.resolve_remote(reference).await
        }
    }

    /// Inline `data:image/<subtype>;base64,<payload>` reference
    async fn resolve_data_uri(&self, rest: &str) -> Result<PathBuf, ResolveError> {
        let (subtype, payload) = rest.split_once(";base64,").ok_or_else(|| {
            ResolveError::InvalidImage("data URI must carry a base64 payload".to_string())
        })?;

        if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ResolveError::InvalidImage(format!(
                "unsupported image subtype: {subtype}"
            )));
        }

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| ResolveError::InvalidImage(e.to_string()))?;

        self.write_scratch(&bytes, subtype).await
    }

    /// Internal file-handle URL: the cached bytes are used in place, no copy
    async fn resolve_file_handle(&self, id: &str) -> Result<PathBuf, ResolveError> {
        match self.files.content_path(id).await {
            Ok((path, _)) => Ok(path),
            Err(FilesError::NotFound(id)) => Err(ResolveError::FileNotFound(id)),
            Err(e) => Err(ResolveError::Io(std::io::Error::other(e.to_string()))),
        }
    }

    /// Generic remote URL: download and infer the extension from Content-Type
    async fn resolve_remote(&self, url: &str) -> Result<PathBuf, ResolveError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Download {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        let ext = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extension_for_content_type)
            .unwrap_or_else(|| "bin".to_string());

        let body = response.bytes().await.map_err(|e| ResolveError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.write_scratch(&body, &ext).await
    }

    async fn write_scratch(&self, data: &[u8], ext: &str) -> Result<PathBuf, ResolveError> {
        fs::create_dir_all(&self.scratch_dir).await?;
        let path = self.scratch_dir.join(format!("{}.{}", scratch_id(), ext));
        fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Image saved");
        Ok(path)
    }
}

/// Random short identifier for scratch filenames; collisions between
/// concurrent resolutions must be impossible in practice.
fn scratch_id() -> String {
    let mut buf = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Extract the file id from an internal file-handle URL
///
/// Matches the shape of this service's own content route,
/// `.../v1/files/{id}/content`, with the id as the second-to-last path
/// segment.
fn internal_file_id(reference: &str) -> Option<String> {
    let rest = reference
        .strip_prefix("http://")
        .or_else(|| reference.strip_prefix("https://"))?;
    let (_, path) = rest.split_once('/')?;
    let path = path.split(['?', '#']).next().unwrap_or(path);

    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    let n = segments.len();
    if n >= 4
        && segments[n - 1] == "content"
        && segments[n - 3] == "files"
        && segments[n - 4] == "v1"
        && segments[n - 2].starts_with(FILE_ID_PREFIX)
    {
        return Some(segments[n - 2].to_string());
    }
    None
}

fn extension_for_content_type(content_type: &str) -> Option<String> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();

    // Prefer the conventional extension for the common image types;
    // mime_guess lists extensions alphabetically ("jpe" before "jpg").
    match essence {
        "image/jpeg" => return Some("jpg".to_string()),
        "image/png" => return Some("png".to_string()),
        _ => {}
    }

    mime_guess::get_mime_extensions_str(essence)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
}
