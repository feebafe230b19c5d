// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent runtime adapter trait.
//!
//! The chat/agent runtime is an external collaborator: given a prompt,
//! history, and injected context, it yields a sequence of heterogeneous
//! stream events which the gateway translates into the SSE wire protocol.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ReverieError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AgentEvent, AgentRequest};

/// A stream of raw agent events, produced sequentially by the runtime.
pub type AgentEventStream = BoxStream<'static, Result<AgentEvent, ReverieError>>;

/// Adapter for the streaming chat/agent runtime.
#[async_trait]
pub trait AgentRuntime: PluginAdapter {
    /// Starts one agent turn and returns its raw event stream.
    ///
    /// Dropping the returned stream cancels the turn; the runtime must
    /// release any resources it holds when that happens.
    async fn stream(&self, request: AgentRequest) -> Result<AgentEventStream, ReverieError>;
}
