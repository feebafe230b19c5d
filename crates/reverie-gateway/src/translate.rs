// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stream event translator.
//!
//! Consumes the agent runtime's raw event stream and emits the wire-level
//! SSE protocol. The translator is a synchronous reducer: each raw event
//! is processed fully (zero or one wire event emitted) before the next is
//! pulled. Terminal states are `done` (source completed) and `error`
//! (source failed); no wire event follows either, and dropping the output
//! stream cancels source consumption.

use axum::response::sse::Event;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use reverie_core::traits::AgentEventStream;
use reverie_core::types::AgentEvent;
use reverie_memory::types::InjectedArtifact;

use crate::session::{StreamSession, ToolCall};

/// A wire-level event, one per SSE frame.
#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    Text {
        chunk: String,
    },
    ToolCall {
        tool_name: String,
        toolkit: String,
        id: String,
    },
    ToolResult {
        tool_name: String,
        toolkit: String,
        id: String,
        success: bool,
        result: Value,
    },
    Done {
        tool_calls: Option<Vec<ToolCall>>,
        session_id: String,
        injected_artifacts: Option<Vec<InjectedArtifact>>,
    },
    Error {
        message: String,
    },
}

/// `done` frame payload; optional lists are omitted when empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DonePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    injected_artifacts: Option<Vec<InjectedArtifact>>,
}

impl WireEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            WireEvent::Text { .. } => "text",
            WireEvent::ToolCall { .. } => "tool_call",
            WireEvent::ToolResult { .. } => "tool_result",
            WireEvent::Done { .. } => "done",
            WireEvent::Error { .. } => "error",
        }
    }

    /// JSON payload carried in the frame's `data` field.
    pub fn data(&self) -> Result<String, serde_json::Error> {
        let value = match self {
            WireEvent::Text { chunk } => json!({ "chunk": chunk }),
            WireEvent::ToolCall {
                tool_name,
                toolkit,
                id,
            } => json!({ "toolName": tool_name, "toolkit": toolkit, "id": id }),
            WireEvent::ToolResult {
                tool_name,
                toolkit,
                id,
                success,
                result,
            } => json!({
                "toolName": tool_name,
                "toolkit": toolkit,
                "id": id,
                "success": success,
                "result": result,
            }),
            WireEvent::Done {
                tool_calls,
                session_id,
                injected_artifacts,
            } => serde_json::to_value(DonePayload {
                tool_calls: tool_calls.clone(),
                session_id: session_id.clone(),
                injected_artifacts: injected_artifacts.clone(),
            })?,
            WireEvent::Error { message } => json!({ "message": message }),
        };
        serde_json::to_string(&value)
    }

    /// Encode as an axum SSE event.
    pub fn into_sse(self) -> Result<Event, serde_json::Error> {
        let data = self.data()?;
        Ok(Event::default().event(self.name()).data(data))
    }
}

/// Translate a raw agent event stream into wire events.
///
/// Exactly one terminal event is produced: `done` after the source
/// completes, or `error` on the first source failure (after which the
/// source is not polled again).
pub fn translate_stream(
    mut source: AgentEventStream,
    mut session: StreamSession,
) -> impl futures::Stream<Item = WireEvent> + Send {
    async_stream::stream! {
        while let Some(item) = source.next().await {
            match item {
                Ok(AgentEvent::TextDelta { text }) => {
                    let visible = session.filter_text(&text);
                    if !visible.is_empty() {
                        yield WireEvent::Text { chunk: visible };
                    }
                }
                Ok(AgentEvent::ToolCallStarted { id, name }) => {
                    let call = session.begin_call(id, &name);
                    metrics::counter!("reverie_stream_tool_calls_total").increment(1);
                    yield WireEvent::ToolCall {
                        tool_name: call.tool_name,
                        toolkit: call.toolkit,
                        id: call.id,
                    };
                }
                Ok(AgentEvent::ToolOutput { id, result }) => {
                    match session.complete_call(&id, result) {
                        Some(call) => {
                            yield WireEvent::ToolResult {
                                tool_name: call.tool_name,
                                toolkit: call.toolkit,
                                id: call.id,
                                success: call.success,
                                result: call.result.unwrap_or(Value::Null),
                            };
                        }
                        None => {
                            // Output without a matching call start cannot be
                            // attributed; dropping it keeps the stream alive.
                            metrics::counter!("reverie_stream_dropped_outputs_total")
                                .increment(1);
                            debug!(call_id = %id, "dropped unattributable tool output");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "agent stream failed");
                    yield WireEvent::Error {
                        message: e.to_string(),
                    };
                    return;
                }
            }
        }

        let tail = session.flush_text();
        if !tail.is_empty() {
            yield WireEvent::Text { chunk: tail };
        }

        let tool_calls = session.take_completed();
        let injected = session.take_injected();
        yield WireEvent::Done {
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            session_id: session.session_id().to_string(),
            injected_artifacts: (!injected.is_empty()).then_some(injected),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use reverie_core::error::ReverieError;
    use reverie_memory::types::ConfidenceTier;
    use serde_json::json;

    fn source(
        events: Vec<Result<AgentEvent, ReverieError>>,
    ) -> AgentEventStream {
        Box::pin(stream::iter(events))
    }

    async fn collect(
        events: Vec<Result<AgentEvent, ReverieError>>,
        session: StreamSession,
    ) -> Vec<WireEvent> {
        translate_stream(source(events), session).collect().await
    }

    fn text(t: &str) -> Result<AgentEvent, ReverieError> {
        Ok(AgentEvent::TextDelta { text: t.into() })
    }

    #[tokio::test]
    async fn text_deltas_become_text_frames() {
        let frames = collect(
            vec![text("hello "), text("world")],
            StreamSession::new("s-1", vec![]),
        )
        .await;
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames[0],
            WireEvent::Text {
                chunk: "hello ".into()
            }
        );
        assert!(matches!(frames[2], WireEvent::Done { .. }));
    }

    #[tokio::test]
    async fn reasoning_is_stripped_across_deltas() {
        let frames = collect(
            vec![text("a<th"), text("ink>hidden</thi"), text("nk>b")],
            StreamSession::new("s-1", vec![]),
        )
        .await;
        let visible: String = frames
            .iter()
            .filter_map(|f| match f {
                WireEvent::Text { chunk } => Some(chunk.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(visible, "ab");
    }

    #[tokio::test]
    async fn delta_consumed_by_marker_emits_nothing() {
        let frames = collect(
            vec![text("<think>all reasoning</think>")],
            StreamSession::new("s-1", vec![]),
        )
        .await;
        // Only the done frame.
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], WireEvent::Done { .. }));
    }

    #[tokio::test]
    async fn tool_lifecycle_emits_call_and_result() {
        let events = vec![
            Ok(AgentEvent::ToolCallStarted {
                id: Some("c-1".into()),
                name: "GMAIL_SEND_EMAIL".into(),
            }),
            Ok(AgentEvent::ToolOutput {
                id: "c-1".into(),
                result: json!({"status": "sent"}),
            }),
        ];
        let frames = collect(events, StreamSession::new("s-1", vec![])).await;
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames[0],
            WireEvent::ToolCall {
                tool_name: "GMAIL_SEND_EMAIL".into(),
                toolkit: "gmail".into(),
                id: "c-1".into(),
            }
        );
        match &frames[1] {
            WireEvent::ToolResult {
                id,
                success,
                result,
                ..
            } => {
                assert_eq!(id, "c-1");
                assert!(success);
                assert_eq!(result, &json!({"status": "sent"}));
            }
            other => panic!("expected ToolResult, got {other:?}"),
        }
        match &frames[2] {
            WireEvent::Done { tool_calls, .. } => {
                let calls = tool_calls.as_ref().expect("completed calls present");
                assert_eq!(calls.len(), 1);
                assert!(calls[0].success);
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_output_is_dropped_silently() {
        let events = vec![
            Ok(AgentEvent::ToolOutput {
                id: "never-started".into(),
                result: json!({"x": 1}),
            }),
            text("still alive"),
        ];
        let frames = collect(events, StreamSession::new("s-1", vec![])).await;
        assert_eq!(frames.len(), 2, "no frame for the orphan output");
        assert_eq!(
            frames[0],
            WireEvent::Text {
                chunk: "still alive".into()
            }
        );
        match &frames[1] {
            WireEvent::Done { tool_calls, .. } => assert!(tool_calls.is_none()),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn done_emitted_exactly_once_and_last() {
        let frames = collect(vec![text("x")], StreamSession::new("s-1", vec![])).await;
        let done_count = frames
            .iter()
            .filter(|f| matches!(f, WireEvent::Done { .. }))
            .count();
        assert_eq!(done_count, 1);
        assert!(matches!(frames.last(), Some(WireEvent::Done { .. })));
    }

    #[tokio::test]
    async fn source_error_terminates_with_single_error_frame() {
        let events = vec![
            text("partial"),
            Err(ReverieError::agent("upstream exploded")),
            // Anything scripted after the failure must never be pulled.
            text("unreachable"),
        ];
        let frames = collect(events, StreamSession::new("s-1", vec![])).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0],
            WireEvent::Text {
                chunk: "partial".into()
            }
        );
        match &frames[1] {
            WireEvent::Error { message } => {
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
        // No done frame after an error.
        assert!(!frames.iter().any(|f| matches!(f, WireEvent::Done { .. })));
    }

    #[tokio::test]
    async fn done_carries_session_and_injected_artifacts() {
        let injected = vec![InjectedArtifact {
            id: "a-1".into(),
            title: "Q3 Planning".into(),
            confidence: ConfidenceTier::High,
        }];
        let frames = collect(vec![], StreamSession::new("s-42", injected)).await;
        match &frames[0] {
            WireEvent::Done {
                session_id,
                injected_artifacts,
                tool_calls,
            } => {
                assert_eq!(session_id, "s-42");
                assert!(tool_calls.is_none());
                let artifacts = injected_artifacts.as_ref().unwrap();
                assert_eq!(artifacts[0].id, "a-1");
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn trailing_partial_marker_flushes_before_done() {
        let frames = collect(
            vec![text("tail <think")],
            StreamSession::new("s-1", vec![]),
        )
        .await;
        // "tail " passes during streaming; "<think" is released at end of
        // stream because it can no longer become a marker.
        let visible: String = frames
            .iter()
            .filter_map(|f| match f {
                WireEvent::Text { chunk } => Some(chunk.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(visible, "tail <think");
        assert!(matches!(frames.last(), Some(WireEvent::Done { .. })));
    }

    #[test]
    fn wire_event_names_match_protocol() {
        assert_eq!(WireEvent::Text { chunk: String::new() }.name(), "text");
        assert_eq!(
            WireEvent::Error {
                message: String::new()
            }
            .name(),
            "error"
        );
    }

    #[test]
    fn done_payload_omits_empty_lists() {
        let done = WireEvent::Done {
            tool_calls: None,
            session_id: "s-1".into(),
            injected_artifacts: None,
        };
        let data = done.data().unwrap();
        assert_eq!(data, r#"{"sessionId":"s-1"}"#);
    }

    #[test]
    fn tool_call_payload_shape() {
        let event = WireEvent::ToolCall {
            tool_name: "GMAIL_SEND_EMAIL".into(),
            toolkit: "gmail".into(),
            id: "c-1".into(),
        };
        let value: serde_json::Value = serde_json::from_str(&event.data().unwrap()).unwrap();
        assert_eq!(value["toolName"], "GMAIL_SEND_EMAIL");
        assert_eq!(value["toolkit"], "gmail");
        assert_eq!(value["id"], "c-1");
    }
}
