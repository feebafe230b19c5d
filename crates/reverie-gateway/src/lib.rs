// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Reverie.
//!
//! Exposes the streaming chat route, translating the agent runtime's raw
//! event stream into the stable SSE wire protocol, plus the distillation
//! trigger and a health endpoint.
//!
//! ## Wire protocol
//!
//! `POST /v1/chat/stream` answers `text/event-stream`; each frame is
//! `event: <name>\ndata: <JSON>\n\n` with event names `text`, `tool_call`,
//! `tool_result`, `done`, and `error`. Exactly one terminal frame (`done`
//! or `error`) closes every stream.

pub mod filter;
pub mod handlers;
pub mod server;
pub mod session;
pub mod translate;

pub use filter::ThinkFilter;
pub use server::{router, start_server, GatewayState};
pub use session::{StreamSession, ToolCall, UNKNOWN_TOOLKIT};
pub use translate::{translate_stream, WireEvent};
