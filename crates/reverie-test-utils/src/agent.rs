// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted agent runtime for deterministic streaming tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use reverie_core::error::ReverieError;
use reverie_core::traits::{AgentEventStream, AgentRuntime, PluginAdapter};
use reverie_core::types::{AdapterType, AgentEvent, AgentRequest, HealthStatus};

/// One scripted item in an agent turn.
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    /// Emit this raw event.
    Event(AgentEvent),
    /// Fail the stream with this message at this point.
    Error(String),
}

impl ScriptedEvent {
    /// Convenience: a text delta event.
    pub fn text(text: &str) -> Self {
        ScriptedEvent::Event(AgentEvent::TextDelta {
            text: text.to_string(),
        })
    }

    /// Convenience: a tool-call start event.
    pub fn tool_start(id: Option<&str>, name: &str) -> Self {
        ScriptedEvent::Event(AgentEvent::ToolCallStarted {
            id: id.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// Convenience: a tool output event.
    pub fn tool_output(id: &str, result: serde_json::Value) -> Self {
        ScriptedEvent::Event(AgentEvent::ToolOutput {
            id: id.to_string(),
            result,
        })
    }
}

/// An `AgentRuntime` that replays pre-scripted turns.
///
/// Turns are popped from a FIFO queue; an exhausted queue yields an empty
/// stream. The most recent request is recorded for assertions.
pub struct ScriptedAgent {
    turns: Mutex<VecDeque<Vec<ScriptedEvent>>>,
    last_request: Mutex<Option<AgentRequest>>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            last_request: Mutex::new(None),
        }
    }

    /// Create an agent pre-loaded with a single turn.
    pub fn with_turn(events: Vec<ScriptedEvent>) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from([events])),
            last_request: Mutex::new(None),
        }
    }

    /// Queue another turn.
    pub async fn push_turn(&self, events: Vec<ScriptedEvent>) {
        self.turns.lock().await.push_back(events);
    }

    /// The request passed to the most recent `stream` call.
    pub async fn last_request(&self) -> Option<AgentRequest> {
        self.last_request.lock().await.clone()
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedAgent {
    fn name(&self) -> &str {
        "scripted-agent"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Agent
    }

    async fn health_check(&self) -> Result<HealthStatus, ReverieError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReverieError> {
        Ok(())
    }
}

#[async_trait]
impl AgentRuntime for ScriptedAgent {
    async fn stream(&self, request: AgentRequest) -> Result<AgentEventStream, ReverieError> {
        *self.last_request.lock().await = Some(request);
        let turn = self.turns.lock().await.pop_front().unwrap_or_default();
        let items: Vec<Result<AgentEvent, ReverieError>> = turn
            .into_iter()
            .map(|scripted| match scripted {
                ScriptedEvent::Event(event) => Ok(event),
                ScriptedEvent::Error(message) => Err(ReverieError::agent(message)),
            })
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}
