use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DOWNLOAD_TIMEOUT_SECS, ENV_HOST, ENV_MODEL, ENV_PORT, ENV_RETENTION_HOURS,
    ENV_RUNTIME_URL, ENV_SWEEP_INTERVAL_SECS,
};

#[derive(Parser)]
#[command(name = "glimpse")]
#[command(version, about = "OpenAI-compatible gateway for a local vision-language chat model", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Served model name (requests must address this exact name)
    #[arg(long, short = 'm', global = true, env = ENV_MODEL)]
    pub model: Option<String>,

    /// Base URL of the inference runtime sidecar
    #[arg(long, global = true, env = ENV_RUNTIME_URL)]
    pub runtime_url: Option<String>,

    /// Retention window for uploaded files, in hours
    #[arg(long, global = true, env = ENV_RETENTION_HOURS)]
    pub retention_hours: Option<i64>,

    /// Expiry sweep interval in seconds (default: daily at local midnight)
    #[arg(long, global = true, env = ENV_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: Option<u64>,

    /// Remote image download timeout in seconds
    #[arg(long, global = true, env = ENV_DOWNLOAD_TIMEOUT_SECS)]
    pub download_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub model: Option<String>,
    pub runtime_url: Option<String>,
    pub retention_hours: Option<i64>,
    pub sweep_interval_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        model: cli.model,
        runtime_url: cli.runtime_url,
        retention_hours: cli.retention_hours,
        sweep_interval_secs: cli.sweep_interval_secs,
        download_timeout_secs: cli.download_timeout_secs,
    };
    (config, cli.command)
}
