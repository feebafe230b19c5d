// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Reverie memory and streaming core.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Reverie workspace. The artifact store,
//! embedding provider, and agent runtime are external collaborators that
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ReverieError;
pub use types::{AdapterType, HealthStatus, SessionId};

// Re-export all adapter traits at crate root.
pub use traits::{AgentRuntime, ArtifactStore, EmbeddingAdapter, PluginAdapter};
