//! API server setup.

use super::handlers::{
    export_csv_handler, export_json_handler, get_handler, health_handler, list_handler, upload_handler,
};
use super::types::ApiState;
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::files::FileService;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Create the API router.
///
/// `max_body_bytes` replaces axum's 2 MB default body limit so that
/// multipart uploads are only bounded by configuration.
pub fn create_router(service: FileService, max_body_bytes: usize) -> Router {
    let state = ApiState { service };

    Router::new()
        .route("/files", get(list_handler).post(upload_handler))
        .route("/files/{id}", get(get_handler))
        .route("/files/{id}/export/json", get(export_json_handler))
        .route("/files/{id}/export/csv", get(export_csv_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.host:config.port` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, service: FileService) -> Result<()> {
    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|e| Error::validation(format!("Invalid host address '{}': {}", config.host, e)))?;

    let addr = SocketAddr::new(ip, config.port);
    let app = create_router(service, config.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("fileshelf listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("fileshelf stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
