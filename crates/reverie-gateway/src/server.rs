// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use reverie_config::model::ReverieConfig;
use reverie_core::error::ReverieError;
use reverie_core::traits::{AgentRuntime, ArtifactStore, EmbeddingAdapter};
use reverie_distill::Distiller;
use reverie_memory::gate::RetrievalGate;
use reverie_memory::scorer::RelevanceScorer;

use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Artifact store collaborator.
    pub store: Arc<dyn ArtifactStore>,
    /// Agent runtime collaborator.
    pub agent: Arc<dyn AgentRuntime>,
    /// The memory retrieval gate.
    pub gate: Arc<RetrievalGate>,
    /// The distillation batch runner.
    pub distiller: Arc<Distiller>,
    /// Loaded configuration.
    pub config: Arc<ReverieConfig>,
    /// Health state.
    pub health: HealthState,
}

impl GatewayState {
    /// Wire up gateway state from the three collaborators and config.
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        agent: Arc<dyn AgentRuntime>,
        config: ReverieConfig,
    ) -> Self {
        let gate = Arc::new(RetrievalGate::new(
            Arc::clone(&store),
            RelevanceScorer::new(Arc::clone(&embedder)),
            config.retrieval.clone(),
        ));
        let distiller = Arc::new(Distiller::new(
            Arc::clone(&store),
            embedder,
            config.distill.clone(),
        ));
        Self {
            store,
            agent,
            gate,
            distiller,
            config: Arc::new(config),
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }
}

/// Build the gateway router.
///
/// Exposed separately from [`start_server`] so tests can drive it with
/// `tower::ServiceExt` without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/chat/stream", post(handlers::post_chat_stream))
        .route("/internal/distill/run", post(handlers::post_distill_run))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start_server(state: GatewayState) -> Result<(), ReverieError> {
    let addr = format!(
        "{}:{}",
        state.config.gateway.host, state.config.gateway.port
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ReverieError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ReverieError::Internal(format!("gateway server error: {e}")))
}
