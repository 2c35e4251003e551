// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Glimpse";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "glimpse";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".glimpse";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "glimpse.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "GLIMPSE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "GLIMPSE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "GLIMPSE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "GLIMPSE_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "GLIMPSE_DATA_DIR";

// =============================================================================
// Environment Variables - Model
// =============================================================================

/// Environment variable for the served model name
pub const ENV_MODEL: &str = "GLIMPSE_MODEL";

/// Environment variable for the inference runtime base URL
pub const ENV_RUNTIME_URL: &str = "GLIMPSE_RUNTIME_URL";

// =============================================================================
// Environment Variables - Files
// =============================================================================

/// Environment variable for the file retention window in hours
pub const ENV_RETENTION_HOURS: &str = "GLIMPSE_RETENTION_HOURS";

/// Environment variable for the expiry sweep interval in seconds
pub const ENV_SWEEP_INTERVAL_SECS: &str = "GLIMPSE_SWEEP_INTERVAL_SECS";

/// Environment variable for the remote image download timeout in seconds
pub const ENV_DOWNLOAD_TIMEOUT_SECS: &str = "GLIMPSE_DOWNLOAD_TIMEOUT_SECS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8420;

/// Default served model name
pub const DEFAULT_MODEL: &str = "Qwen/Qwen-VL-Chat-Int4";

/// Default inference runtime base URL
pub const DEFAULT_RUNTIME_URL: &str = "http://127.0.0.1:8421";

/// Maximum request body size (uploads included)
pub const DEFAULT_BODY_LIMIT: usize = 512 * 1024 * 1024;

// =============================================================================
// File Lifecycle Defaults
// =============================================================================

/// Prefix for generated file identifiers
pub const FILE_ID_PREFIX: &str = "file-";

/// Default retention window for uploaded files, in hours
pub const DEFAULT_RETENTION_HOURS: i64 = 6;

/// Default remote image download timeout, in seconds
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SQLite
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "file_records.db";

/// SQLite connection pool size
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Shutdown
// =============================================================================

/// Timeout for background tasks to finish during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
