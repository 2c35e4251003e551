//! Data storage layer
//!
//! - `sqlite` - metadata store for uploaded file records
//! - `files` - byte cache, files service, and expiry sweep
//! - `types` - shared data types

pub mod files;
pub mod sqlite;
pub mod types;

pub use files::{FileCache, FileService, FilesError};
pub use sqlite::{SqliteService, StoreError};
pub use types::{FilePurpose, FileRecord};
