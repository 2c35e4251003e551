//! Core application

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::{AppStorage, DataSubdir};
use crate::data::files::{sweeper, FileCache, FileService};
use crate::data::sqlite::SqliteService;
use crate::domain::chat::{ChatService, ImageResolver, RuntimeGenerator, TextGenerator};

pub struct App {
    pub config: AppConfig,
    pub storage: AppStorage,
    pub shutdown: ShutdownService,
    pub files: Arc<FileService>,
    pub chat: Arc<ChatService>,
}

impl App {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        match command {
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;

        let database = SqliteService::init(&storage)
            .await
            .context("Failed to initialize metadata store")?;
        let pool = database.pool().clone();

        let cache = FileCache::new(storage.subdir(DataSubdir::Files));
        let files = Arc::new(FileService::new(
            pool.clone(),
            cache,
            config.files.retention_hours,
        ));

        let resolver = ImageResolver::new(
            files.clone(),
            storage.subdir(DataSubdir::Scratch),
            Duration::from_secs(config.http.download_timeout_secs),
        )
        .context("Failed to build download client")?;

        let generator: Arc<dyn TextGenerator> =
            Arc::new(RuntimeGenerator::new(config.model.runtime_url.clone()));
        let chat = Arc::new(ChatService::new(
            config.model.name.clone(),
            generator,
            resolver,
        ));

        let shutdown = ShutdownService::new(pool);

        Ok(Self {
            config,
            storage,
            shutdown,
            files,
            chat,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(sweeper::start_sweep_task(
                self.files.clone(),
                self.config.files.sweep_interval_secs,
                self.shutdown.subscribe(),
            ))
            .await;

        tracing::debug!("Background tasks started");
    }
}
