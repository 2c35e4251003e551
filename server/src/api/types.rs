//! Shared API types
//!
//! One error type at the HTTP boundary. Every core failure is translated
//! here, exactly once, into the documented OpenAI-style error envelope:
//! `{"object":"error","message":...,"type":...,"param":null,"code":...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::data::files::FilesError;
use crate::domain::chat::{ChatError, ResolveError};

/// Standard API error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    data: Option<serde_json::Value>,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn not_found(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, kind, message)
    }

    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, "NotImplementedError", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            message,
        )
    }

    /// Map a files-service failure onto its documented envelope
    pub fn from_files(e: FilesError) -> Self {
        match e {
            FilesError::NotFound(id) => {
                Self::not_found("FileNotFound", format!("The file '{id}' is not found"))
            }
            FilesError::InvalidPurpose(purpose) => {
                Self::bad_request("ValueError", format!("Invalid file purpose `{purpose}`."))
            }
            FilesError::NotImplemented(_) => {
                Self::not_found("NotFoundError", "List files api not supported.")
            }
            e @ (FilesError::Store(_) | FilesError::Cache(_)) => {
                tracing::error!(error = %e, "File operation failed");
                Self::internal("File operation failed")
            }
        }
    }

    /// Map a chat-pipeline failure onto its documented envelope
    pub fn from_chat(e: ChatError) -> Self {
        match e {
            ChatError::ModelNotFound(name) => {
                Self::not_found("NotFoundError", format!("The model `{name}` does not exist."))
            }
            ChatError::FunctionCallNotAllowed(name) => Self::not_found(
                "NotImplementedError",
                format!("Function call `{name}` is not allowed."),
            ),
            ChatError::InvalidMessageSequence { messages, detail } => {
                tracing::debug!(detail = %detail, "Rejected malformed message sequence");
                let mut error = Self::not_found(
                    "ValueError",
                    "The last message should be from the user.",
                );
                error.data = serde_json::to_value(&messages).ok();
                error
            }
            ChatError::NotImplemented(feature) => {
                Self::not_implemented(format!("{feature} is not implemented."))
            }
            ChatError::Resolve(ResolveError::FileNotFound(id)) => {
                Self::not_found("FileNotFound", format!("The file '{id}' is not found"))
            }
            ChatError::Resolve(ResolveError::InvalidImage(detail)) => {
                Self::bad_request("ValueError", format!("Invalid image reference: {detail}"))
            }
            ChatError::Resolve(e @ ResolveError::Download { .. }) => {
                Self::bad_request("ValueError", e.to_string())
            }
            ChatError::Resolve(ResolveError::Io(e)) => {
                tracing::error!(error = %e, "Image resolution failed");
                Self::internal("Image resolution failed")
            }
            ChatError::Generate(e) => {
                tracing::error!(error = %e, "Generation failed");
                Self::internal("Generation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "object": "error",
            "message": self.message,
            "type": self.kind,
            "param": null,
            "code": self.status.as_u16(),
        });
        if let Some(data) = self.data {
            body["data"] = data;
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_envelope() {
        let error = ApiError::from_chat(ChatError::ModelNotFound("gpt-4".to_string()));
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.kind, "NotFoundError");
        assert_eq!(error.message, "The model `gpt-4` does not exist.");
        assert!(error.data.is_none());
    }

    #[test]
    fn test_invalid_sequence_carries_data() {
        let error = ApiError::from_chat(ChatError::InvalidMessageSequence {
            messages: vec![],
            detail: "detail".to_string(),
        });
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.kind, "ValueError");
        assert_eq!(error.message, "The last message should be from the user.");
        assert_eq!(error.data, Some(serde_json::json!([])));
    }

    #[test]
    fn test_stream_maps_to_501() {
        let error = ApiError::from_chat(ChatError::NotImplemented("Stream chat"));
        assert_eq!(error.status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(error.message, "Stream chat is not implemented.");
    }

    #[test]
    fn test_file_not_found_envelope() {
        let error = ApiError::from_files(FilesError::NotFound("file-abc".to_string()));
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.kind, "FileNotFound");
        assert_eq!(error.message, "The file 'file-abc' is not found");
    }

    #[test]
    fn test_list_files_envelope() {
        let error = ApiError::from_files(FilesError::NotImplemented("List files api"));
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.kind, "NotFoundError");
        assert_eq!(error.message, "List files api not supported.");
    }
}
