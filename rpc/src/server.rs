//! Axum-based relay server.

use crate::error::RpcError;
use crate::handlers::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

/// Build the relay router for the given orchestrator.
pub fn router(orchestrator: AppState) -> Router {
    Router::new()
        .route("/api/artist/submit", post(handlers::submit))
        .route("/api/artist/verify", post(handlers::verify))
        .route("/api/artist/reject", post(handlers::reject))
        .route("/api/artist/status/:address", get(handlers::status))
        .route("/api/artist/verified", get(handlers::verified_list))
        .layer(CorsLayer::permissive())
        .with_state(orchestrator)
}

/// The relay server, configured with a port and the shared orchestrator.
pub struct RpcServer {
    pub port: u16,
    orchestrator: AppState,
}

impl RpcServer {
    pub fn new(port: u16, orchestrator: AppState) -> Self {
        Self { port, orchestrator }
    }

    /// Serve until the shutdown signal fires.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let app = router(Arc::clone(&self.orchestrator));
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        tracing::info!("RPC server listening on {addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
