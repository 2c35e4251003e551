//! Files endpoints
//!
//! OpenAI-compatible files surface: multipart upload, metadata retrieval,
//! deletion, and raw content streaming. Uploads are spooled to the temp
//! directory in bounded chunks (multipart fields arrive in client order,
//! so `purpose` may follow the file), then streamed into the cache.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::api::types::ApiError;
use crate::data::files::FileService;
use crate::data::types::{FilePurpose, FileRecord};

/// State for files API
#[derive(Clone)]
pub struct FilesApiState {
    pub files: Arc<FileService>,
    /// Spool area for in-flight multipart uploads
    pub spool_dir: PathBuf,
}

/// Build files API routes
pub fn routes(state: FilesApiState) -> Router {
    Router::new()
        .route("/", post(upload_file).get(list_files))
        .route("/{id}", get(retrieve_file).delete(delete_file))
        .route("/{id}/content", get(retrieve_file_content))
        .with_state(state)
}

/// Wire shape of a file record
#[derive(Debug, Serialize)]
pub struct FileObject {
    pub id: String,
    pub object: &'static str,
    pub bytes: i64,
    pub created_at: i64,
    pub filename: String,
    pub purpose: FilePurpose,
}

impl From<FileRecord> for FileObject {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            object: "file",
            bytes: record.bytes,
            created_at: record.created_at,
            filename: record.filename,
            purpose: record.purpose,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileDeleteResponse {
    pub id: String,
    pub object: &'static str,
    pub deleted: bool,
}

struct StagedUpload {
    spool_path: PathBuf,
    filename: String,
    content_type: String,
}

fn bad_multipart(e: MultipartError) -> ApiError {
    ApiError::bad_request("ValueError", format!("Malformed multipart request: {e}"))
}

/// Upload a file (multipart: `file` + `purpose`)
pub async fn upload_file(
    State(state): State<FilesApiState>,
    mut multipart: Multipart,
) -> Result<Json<FileObject>, ApiError> {
    let mut purpose: Option<String> = None;
    let mut staged: Option<StagedUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("purpose") => {
                purpose = Some(field.text().await.map_err(bad_multipart)?);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let spool_path = state
                    .spool_dir
                    .join(format!("upload-{}", Uuid::new_v4().simple()));

                spool_field(&spool_path, field).await?;
                staged = Some(StagedUpload {
                    spool_path,
                    filename,
                    content_type,
                });
            }
            _ => {}
        }
    }

    let staged = staged
        .ok_or_else(|| ApiError::bad_request("ValueError", "Missing required `file` field."))?;

    let result = match purpose {
        Some(purpose) => finish_upload(&state, &staged, &purpose).await,
        None => Err(ApiError::bad_request(
            "ValueError",
            "Missing required `purpose` field.",
        )),
    };

    if let Err(e) = fs::remove_file(&staged.spool_path).await {
        tracing::warn!(
            path = %staged.spool_path.display(),
            error = %e,
            "Failed to remove upload spool file"
        );
    }

    result
}

/// Stream a multipart field into the spool area in bounded chunks
async fn spool_field(path: &FsPath, mut field: Field<'_>) -> Result<(), ApiError> {
    let stage_error = |e: &dyn std::fmt::Display| {
        tracing::error!(error = %e, "Failed to stage upload");
        ApiError::internal("Failed to stage upload")
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| stage_error(&e))?;
    }

    let mut file = fs::File::create(path).await.map_err(|e| stage_error(&e))?;

    let result = async {
        while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
            file.write_all(&chunk).await.map_err(|e| stage_error(&e))?;
        }
        file.flush().await.map_err(|e| stage_error(&e))?;
        Ok(())
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(path).await;
    }
    result
}

/// Hand the spooled bytes to the files service
async fn finish_upload(
    state: &FilesApiState,
    staged: &StagedUpload,
    purpose: &str,
) -> Result<Json<FileObject>, ApiError> {
    let file = fs::File::open(&staged.spool_path).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to reopen staged upload");
        ApiError::internal("Failed to stage upload")
    })?;

    let record = state
        .files
        .upload(
            ReaderStream::new(file),
            &staged.filename,
            &staged.content_type,
            purpose,
        )
        .await
        .map_err(ApiError::from_files)?;

    Ok(Json(record.into()))
}

/// Listing files is intentionally unsupported
pub async fn list_files(
    State(state): State<FilesApiState>,
) -> Result<Json<Vec<FileObject>>, ApiError> {
    state
        .files
        .list()
        .map(|records| Json(records.into_iter().map(FileObject::from).collect()))
        .map_err(ApiError::from_files)
}

/// Return information about a specific file
pub async fn retrieve_file(
    State(state): State<FilesApiState>,
    Path(id): Path<String>,
) -> Result<Json<FileObject>, ApiError> {
    tracing::info!(id, "Retrieving file");

    let record = state
        .files
        .get_metadata(&id)
        .await
        .map_err(ApiError::from_files)?;

    Ok(Json(record.into()))
}

/// Delete a specific file
pub async fn delete_file(
    State(state): State<FilesApiState>,
    Path(id): Path<String>,
) -> Result<Json<FileDeleteResponse>, ApiError> {
    state.files.delete(&id).await.map_err(ApiError::from_files)?;

    Ok(Json(FileDeleteResponse {
        id,
        object: "file",
        deleted: true,
    }))
}

/// Stream the content of a specific file
pub async fn retrieve_file_content(
    State(state): State<FilesApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    tracing::info!(id, "Retrieving file content");

    let (path, record) = state
        .files
        .content_path(&id)
        .await
        .map_err(ApiError::from_files)?;

    let file = fs::File::open(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::not_found("FileNotFound", format!("The file '{id}' is not found"))
        } else {
            tracing::error!(error = %e, "Failed to open file content");
            ApiError::internal("Failed to open file content")
        }
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        record
            .content_type
            .parse()
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(record.bytes));

    let disposition = format!(
        "attachment; filename=\"{}\"",
        record.filename.replace(['"', '\r', '\n'], "_")
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        disposition
            .parse()
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
