//! Shared data types for the metadata store

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::constants::FILE_ID_PREFIX;

/// Intended use of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilePurpose {
    #[serde(rename = "fine-tune")]
    FineTune,
    #[serde(rename = "fine-tune-results")]
    FineTuneResults,
    #[serde(rename = "assistants")]
    Assistants,
    #[serde(rename = "assistants_output")]
    AssistantsOutput,
}

impl FilePurpose {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FilePurpose::FineTune => "fine-tune",
            FilePurpose::FineTuneResults => "fine-tune-results",
            FilePurpose::Assistants => "assistants",
            FilePurpose::AssistantsOutput => "assistants_output",
        }
    }
}

impl fmt::Display for FilePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fine-tune" => Ok(FilePurpose::FineTune),
            "fine-tune-results" => Ok(FilePurpose::FineTuneResults),
            "assistants" => Ok(FilePurpose::Assistants),
            "assistants_output" => Ok(FilePurpose::AssistantsOutput),
            _ => Err(format!(
                "Invalid purpose '{}'. Valid options: fine-tune, fine-tune-results, \
                 assistants, assistants_output",
                s
            )),
        }
    }
}

/// Metadata record for an uploaded file
///
/// A record exists in the store iff the corresponding bytes exist in the
/// file cache; the two are created together and deleted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Opaque identifier: `file-` + 32 lowercase hex characters
    pub id: String,
    /// User-supplied filename; never used to build storage paths
    pub filename: String,
    /// Size in bytes as written to the cache
    pub bytes: i64,
    pub purpose: FilePurpose,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    /// Unix timestamp (seconds) past which the record is eligible for deletion
    pub expiration: i64,
    /// MIME type reported at upload
    pub content_type: String,
}

/// Generate a fresh file identifier: `file-` + the hex form of a v4 UUID.
pub fn generate_file_id() -> String {
    format!("{}{}", FILE_ID_PREFIX, Uuid::new_v4().simple())
}
