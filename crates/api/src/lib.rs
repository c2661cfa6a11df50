//! `api` crate: HTTP REST API layer.
//!
//! Exposes:
//!   GET    /api/health
//!   GET    /api/algorithms
//!   POST   /api/execute

pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use engine::OperatorRegistry;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared state handed to every handler. The registry is process-wide and
/// read-only, so handlers need no locking.
#[derive(Clone)]
pub struct AppState {
    pub registry: &'static OperatorRegistry,
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/algorithms", get(handlers::algorithms::list))
        .route("/api/execute", post(handlers::execute::execute))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl-C.
pub async fn serve(config: ServerConfig, registry: &'static OperatorRegistry) -> std::io::Result<()> {
    let app = router(AppState { registry }, &config);
    let listener = TcpListener::bind(&config.bind).await?;
    info!(bind = %config.bind, operators = registry.len(), "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}
