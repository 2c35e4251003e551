//! Application configuration
//!
//! Layered configuration: built-in defaults, then the profile config file
//! (`~/.glimpse/glimpse.json`), then a local or CLI-specified config file,
//! then CLI arguments (which carry env var fallbacks via clap).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_MODEL,
    DEFAULT_PORT, DEFAULT_RETENTION_HOURS, DEFAULT_RUNTIME_URL,
};

/// Server configuration section
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Model configuration section
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Name the served model is addressed by in requests
    pub name: String,
    /// Base URL of the inference runtime sidecar
    pub runtime_url: String,
}

/// File lifecycle configuration section
#[derive(Debug, Clone)]
pub struct FilesConfig {
    /// Retention window for uploaded files, in hours
    pub retention_hours: i64,
    /// Sweep interval override in seconds; None means daily at local midnight
    pub sweep_interval_secs: Option<u64>,
}

/// Outbound HTTP configuration section
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout for remote image downloads, in seconds
    pub download_timeout_secs: u64,
}

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub files: FilesConfig,
    pub http: HttpConfig,
}

/// Server configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Model configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ModelFileConfig {
    pub name: Option<String>,
    pub runtime_url: Option<String>,
}

/// Files configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilesFileConfig {
    pub retention_hours: Option<i64>,
    pub sweep_interval_secs: Option<u64>,
}

/// Outbound HTTP configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HttpFileConfig {
    pub download_timeout_secs: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub model: Option<ModelFileConfig>,
    pub files: Option<FilesFileConfig>,
    pub http: Option<HttpFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra {
            if !map.is_empty() {
                let keys_str: String = map
                    .keys()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::warn!(
                    fields = %keys_str,
                    "Unknown fields in config file (possible typos)"
                );
            }
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(model) = other.model {
            let current = self.model.get_or_insert_with(ModelFileConfig::default);
            if model.name.is_some() {
                current.name = model.name;
            }
            if model.runtime_url.is_some() {
                current.runtime_url = model.runtime_url;
            }
        }

        if let Some(files) = other.files {
            let current = self.files.get_or_insert_with(FilesFileConfig::default);
            if files.retention_hours.is_some() {
                current.retention_hours = files.retention_hours;
            }
            if files.sweep_interval_secs.is_some() {
                current.sweep_interval_secs = files.sweep_interval_secs;
            }
        }

        if let Some(http) = other.http {
            let current = self.http.get_or_insert_with(HttpFileConfig::default);
            if http.download_timeout_secs.is_some() {
                current.download_timeout_secs = http.download_timeout_secs;
            }
        }
    }
}

/// Path to the profile config file (`~/.glimpse/glimpse.json`)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs_home().map(|home| home.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.glimpse/glimpse.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path() {
            if profile_path.exists() {
                let profile_config = FileConfig::load_from_file(&profile_path)?;
                profile_config.warn_unknown_fields();
                file_config.merge(profile_config);
                found_configs.push(profile_path.display().to_string());
            }
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                None
            }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_model = file_config.model.unwrap_or_default();
        let file_files = file_config.files.unwrap_or_default();
        let file_http = file_config.http.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let model_name = cli
            .model
            .clone()
            .or(file_model.name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let runtime_url = cli
            .runtime_url
            .clone()
            .or(file_model.runtime_url)
            .unwrap_or_else(|| DEFAULT_RUNTIME_URL.to_string());

        let retention_hours = cli
            .retention_hours
            .or(file_files.retention_hours)
            .unwrap_or(DEFAULT_RETENTION_HOURS);
        if retention_hours <= 0 {
            anyhow::bail!("files.retention_hours must be positive, got {retention_hours}");
        }

        let sweep_interval_secs = cli.sweep_interval_secs.or(file_files.sweep_interval_secs);

        let download_timeout_secs = cli
            .download_timeout_secs
            .or(file_http.download_timeout_secs)
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS);

        Ok(Self {
            server: ServerConfig { host, port },
            model: ModelConfig {
                name: model_name,
                runtime_url,
            },
            files: FilesConfig {
                retention_hours,
                sweep_interval_secs,
            },
            http: HttpConfig {
                download_timeout_secs,
            },
        })
    }
}
