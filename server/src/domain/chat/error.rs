//! Chat pipeline error types

use thiserror::Error;

use super::generate::GenerateError;
use super::messages::ChatMessage;

/// Errors from resolving an image reference into local bytes
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Internal file-handle URL whose id has no unexpired record
    #[error("file `{0}` not found")]
    FileNotFound(String),

    #[error("invalid image data: {0}")]
    InvalidImage(String),

    #[error("failed to download `{url}`: {reason}")]
    Download { url: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the chat completion pipeline
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("the model `{0}` does not exist")]
    ModelNotFound(String),

    #[error("function call `{0}` is not allowed")]
    FunctionCallNotAllowed(String),

    /// Malformed message sequence; carries the original list for diagnostics
    #[error("{detail}")]
    InvalidMessageSequence {
        messages: Vec<ChatMessage>,
        detail: String,
    },

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),
}
