// HTTP server module
// axum router exposing upload, search and the generative proxy

pub mod errors;
pub mod routes;


use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::knowledge::KnowledgeBase;
use crate::proxy::GenerativeClient;

pub use errors::ApiError;

/// Shared state handed to every request handler
pub struct AppState {
    pub knowledge: Arc<KnowledgeBase>,
    pub generative: Arc<GenerativeClient>,
    pub default_k: usize,
}

/// Build the application router
#[inline]
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let shared = Arc::new(state);

    let api = Router::new()
        .route("/upload", post(routes::upload_document))
        .route("/upload/", post(routes::upload_document))
        .route("/search", get(routes::search))
        .route("/search/", get(routes::search))
        .route("/gemini-proxy", post(routes::gemini_proxy))
        .route("/status", get(routes::status))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()));

    let static_dir = &config.static_dir;
    let router = if static_dir.is_dir() {
        info!("Serving front-end from {}", static_dir.display());
        api.route_service("/", ServeFile::new(static_dir.join("index.html")))
            .nest_service("/static", ServeDir::new(static_dir))
    } else {
        warn!(
            "Static directory {} not found, front-end disabled",
            static_dir.display()
        );
        api
    };

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Bind the configured address and serve until interrupted
#[inline]
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let app = build_router(state, config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
