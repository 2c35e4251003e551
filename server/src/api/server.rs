//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes::chat::{chat_completions, ChatApiState};
use super::routes::files::{self, FilesApiState};
use super::routes::models::list_models;
use crate::app::App;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::storage::DataSubdir;

pub struct ApiServer {
    app: App,
}

impl ApiServer {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Returns App for graceful shutdown
    pub async fn start(self) -> Result<App> {
        let app = self.app;

        // Clone shutdown before moving app
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let chat_routes = Router::new()
            .route("/v1/models", get(list_models))
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(ChatApiState {
                chat: app.chat.clone(),
            });

        let files_routes = files::routes(FilesApiState {
            files: app.files.clone(),
            spool_dir: app.storage.subdir(DataSubdir::FilesTemp),
        });

        let router = Router::new()
            .merge(chat_routes)
            .nest("/v1/files", files_routes)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            model = %app.chat.model_name(),
            "Glimpse server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
