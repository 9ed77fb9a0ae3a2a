//! Axum-based HTTP server.

use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use yam_store::RecordStore;
use yam_verification::ProofVerifier;

use crate::error::RpcError;
use crate::handlers;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub verifier: Arc<dyn ProofVerifier>,
}

pub struct RpcServer {
    port: u16,
    state: AppState,
}

impl RpcServer {
    pub fn new(port: u16, store: Arc<dyn RecordStore>, verifier: Arc<dyn ProofVerifier>) -> Self {
        Self {
            port,
            state: AppState { store, verifier },
        }
    }

    /// Build the router. CORS is permissive: the browser frontend is served
    /// from another origin.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/verify", post(handlers::verify))
            .route("/check-verification", post(handlers::check_verification))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind and serve until shutdown.
    pub async fn start(&self) -> Result<(), RpcError> {
        let addr = format!("0.0.0.0:{}", self.port);
        info!("verification service listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        axum::serve(listener, self.router())
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
