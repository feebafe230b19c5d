// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles POST /v1/chat/stream, POST /internal/distill/run, GET /health.

use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, Sse},
    response::{IntoResponse, Response},
    Json,
};
use futures::{future, stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use reverie_core::types::{AgentRequest, HistoryMessage};
use reverie_memory::context::{format_for_context, resolve_candidates};
use reverie_memory::types::InjectedArtifact;

use crate::server::GatewayState;
use crate::session::StreamSession;
use crate::translate::{translate_stream, WireEvent};

/// Request body for POST /v1/chat/stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamRequest {
    /// Opaque identifier of the requesting user.
    pub user_id: String,
    /// Message text. Validated by the handler so a missing message gets
    /// the protocol's error shape rather than a generic decode failure.
    #[serde(default)]
    pub message: Option<String>,
    /// Session id to report on the done frame; generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Recent conversation history, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    /// Artifact ids the client pinned for injection.
    #[serde(default)]
    pub manual_artifact_ids: Vec<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// POST /v1/chat/stream
///
/// Validates input, runs memory retrieval (degrading to no context on any
/// retrieval failure), starts the agent turn, and streams the translated
/// SSE protocol. The 4xx for malformed input is set before any frame is
/// written.
pub async fn post_chat_stream(
    State(state): State<GatewayState>,
    Json(body): Json<ChatStreamRequest>,
) -> Response {
    let Some(message) = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
    else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "message is required".to_string(),
            }),
        )
            .into_response();
    };

    let session_id = body
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let (context, injected) = retrieve_context(
        &state,
        &body.user_id,
        message,
        &body.history,
        &body.manual_artifact_ids,
    )
    .await;
    metrics::counter!("reverie_injected_artifacts_total").increment(injected.len() as u64);

    let request = AgentRequest {
        user_id: body.user_id.clone(),
        message: message.to_string(),
        history: body.history.clone(),
        context,
    };
    let session = StreamSession::new(session_id, injected);

    match state.agent.stream(request).await {
        Ok(source) => sse_response(translate_stream(source, session)),
        Err(e) => {
            // A turn that fails to start still answers with the protocol's
            // single error frame.
            warn!(error = %e, "agent stream failed to start");
            sse_response(stream::iter(vec![WireEvent::Error {
                message: e.to_string(),
            }]))
        }
    }
}

/// Run retrieval for one turn.
///
/// Any scorer or store failure degrades to "no context injected"; it is
/// logged and never aborts the chat turn.
async fn retrieve_context(
    state: &GatewayState,
    user_id: &str,
    message: &str,
    history: &[HistoryMessage],
    manual_ids: &[String],
) -> (Option<String>, Vec<InjectedArtifact>) {
    let annotated = match state
        .gate
        .find_assist(user_id, message, history, manual_ids)
        .await
    {
        Ok(annotated) => annotated,
        Err(e) => {
            warn!(error = %e, "retrieval failed, continuing without context");
            return (None, Vec::new());
        }
    };
    if annotated.is_empty() {
        return (None, Vec::new());
    }

    let candidates: Vec<_> = annotated.iter().map(|(c, _)| c.clone()).collect();
    let resolved = match resolve_candidates(
        &state.store,
        &candidates,
        state.config.retrieval.entries_per_artifact,
    )
    .await
    {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(error = %e, "candidate resolution failed, continuing without context");
            return (None, Vec::new());
        }
    };

    let injected = annotated
        .iter()
        .filter_map(|(candidate, tier)| {
            resolved
                .iter()
                .find(|r| r.artifact.id == candidate.artifact_id)
                .map(|r| InjectedArtifact {
                    id: r.artifact.id.clone(),
                    title: r.artifact.title.clone(),
                    confidence: *tier,
                })
        })
        .collect();

    let block = format_for_context(&resolved, state.config.retrieval.context_char_budget);
    ((!block.is_empty()).then_some(block), injected)
}

/// Encode wire events as an SSE response.
///
/// A frame that fails to encode becomes the stream's single terminal
/// `error` frame; nothing is emitted after it.
fn sse_response(frames: impl Stream<Item = WireEvent> + Send + 'static) -> Response {
    let events = frames.scan(false, |terminated, event| {
        if *terminated {
            return future::ready(None);
        }
        let frame = match event.into_sse() {
            Ok(frame) => frame,
            Err(e) => {
                *terminated = true;
                Event::default()
                    .event("error")
                    .data(json!({ "message": format!("frame encoding failed: {e}") }).to_string())
            }
        };
        future::ready(Some(Ok::<_, Infallible>(frame)))
    });
    Sse::new(events).into_response()
}

/// POST /internal/distill/run
///
/// Entry point for the external scheduler. Returns the run's counters;
/// per-user failures are inside the body, not an HTTP error.
pub async fn post_distill_run(State(state): State<GatewayState>) -> Response {
    match state.distiller.run_for_all_users().await {
        Ok(run) => (StatusCode::OK, Json(run)).into_response(),
        Err(e) => {
            warn!(error = %e, "distillation run failed to enumerate users");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
