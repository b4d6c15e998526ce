//! Answering relay
//!
//! Server-side half of the chat widget: the widget posts `{query}` to
//! `/api/chat`, the relay forwards it to the remote answering service and
//! replies `{response, sources, error}`. Upstream failures still produce a
//! 200 with a friendly `response` and the diagnostic in `error`; only
//! malformed requests get a 400.

mod routes;
mod service;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use routes::{ChatHealthResponse, HealthResponse};
pub use service::{AnswerService, ChatAnswer, RemoteRagService};

use crate::config::RelayConfig;
use crate::{Error, Result};

/// HTTP server exposing the chat routes
pub struct RelayServer {
    service: Arc<dyn AnswerService>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl RelayServer {
    #[must_use]
    pub fn new(service: Arc<dyn AnswerService>, port: u16) -> Self {
        Self {
            service,
            port,
            static_dir: None,
        }
    }

    /// Relay to the configured remote answering service
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let service = RemoteRagService::new(&config.upstream_url, config.timeout)?;
        Ok(Self::new(Arc::new(service), config.port).static_dir(config.static_dir.clone()))
    }

    /// Serve widget assets from `dir` for unmatched paths
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::chat_router(Arc::clone(&self.service)))
            .merge(routes::health_router());

        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // The widget may be embedded on another origin
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the relay until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind relay server: {e}")))?;

        tracing::info!(port = self.port, "relay server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("relay server error: {e}")))?;

        Ok(())
    }
}
