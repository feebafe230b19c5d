// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request stream state: the in-flight tool-call table, completed
//! calls, injected artifacts, and the think-tag filter.
//!
//! A `StreamSession` is constructed when a streaming response starts and
//! dropped when it closes. It is owned exclusively by the handling task;
//! there is no process-wide registry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reverie_memory::types::InjectedArtifact;
use serde::Serialize;

use crate::filter::ThinkFilter;

/// Toolkit label for tool names without a recognizable separator.
///
/// Callers depend on this literal sentinel; do not infer a toolkit any
/// other way.
pub const UNKNOWN_TOOLKIT: &str = "unknown";

/// Separators recognized when deriving a toolkit from a tool name.
const TOOLKIT_SEPARATORS: [char; 3] = ['_', '-', '.'];

/// One tool invocation observed on the stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Stable id, unique within the session.
    pub id: String,
    /// Full tool name as reported by the runtime.
    pub tool_name: String,
    /// Coarse service label derived from the tool name.
    pub toolkit: String,
    /// False until output is attributed to this call.
    pub success: bool,
    /// When the call started.
    pub timestamp: DateTime<Utc>,
    /// Output payload, present once the call completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// Derive the toolkit label: the lowercase prefix of the tool name up to
/// its first separator. Names without a separator (or with an empty
/// prefix) degrade to [`UNKNOWN_TOOLKIT`].
pub fn toolkit_of(tool_name: &str) -> String {
    match tool_name.find(TOOLKIT_SEPARATORS) {
        Some(pos) if pos > 0 => tool_name[..pos].to_ascii_lowercase(),
        _ => UNKNOWN_TOOLKIT.to_string(),
    }
}

/// Mutable state for one streaming response.
pub struct StreamSession {
    session_id: String,
    open_calls: HashMap<String, ToolCall>,
    completed: Vec<ToolCall>,
    injected: Vec<InjectedArtifact>,
    filter: ThinkFilter,
}

impl StreamSession {
    pub fn new(session_id: impl Into<String>, injected: Vec<InjectedArtifact>) -> Self {
        Self {
            session_id: session_id.into(),
            open_calls: HashMap::new(),
            completed: Vec::new(),
            injected,
            filter: ThinkFilter::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Pass a text delta through the think-tag filter.
    pub fn filter_text(&mut self, text: &str) -> String {
        self.filter.push(text)
    }

    /// Flush any classifiable filter tail at end of stream.
    pub fn flush_text(&mut self) -> String {
        self.filter.finish()
    }

    /// Record a newly started tool call and return its wire view.
    ///
    /// Prefers the runtime's explicit call id; otherwise synthesizes one
    /// from a timestamp and random suffix.
    pub fn begin_call(&mut self, id: Option<String>, tool_name: &str) -> ToolCall {
        let id = id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(synthesize_call_id);
        let call = ToolCall {
            id: id.clone(),
            tool_name: tool_name.to_string(),
            toolkit: toolkit_of(tool_name),
            success: false,
            timestamp: Utc::now(),
            result: None,
        };
        self.open_calls.insert(id, call.clone());
        call
    }

    /// Attribute output to an open call, marking it successful and moving
    /// it to the completed list. Returns `None` for unknown ids, which the
    /// caller drops without emitting anything.
    pub fn complete_call(
        &mut self,
        id: &str,
        result: serde_json::Value,
    ) -> Option<ToolCall> {
        let mut call = self.open_calls.remove(id)?;
        call.success = true;
        call.result = Some(result);
        self.completed.push(call.clone());
        Some(call)
    }

    /// Completed calls accumulated so far, in completion order.
    pub fn take_completed(&mut self) -> Vec<ToolCall> {
        std::mem::take(&mut self.completed)
    }

    /// Artifacts injected into this turn by retrieval.
    pub fn take_injected(&mut self) -> Vec<InjectedArtifact> {
        std::mem::take(&mut self.injected)
    }
}

fn synthesize_call_id() -> String {
    format!(
        "call-{}-{:04x}",
        Utc::now().timestamp_millis(),
        rand::random::<u16>()
    )
}
