//! Glimpse: an OpenAI-compatible HTTP gateway in front of a locally hosted
//! vision-language chat model.
//!
//! The server exposes a chat-completions endpoint and a files endpoint used
//! to stage uploaded images that chat requests reference by URL. Uploaded
//! files are time-bounded: metadata lives in SQLite, bytes in an id-keyed
//! cache directory, and a periodic sweep deletes both once the retention
//! window has passed.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
