// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Reverie memory and streaming core.

use thiserror::Error;

/// The primary error type used across all Reverie adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ReverieError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Artifact store errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding provider errors (model failure, dimension mismatch, transport).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Agent runtime errors (upstream stream failure, malformed events).
    #[error("agent error: {message}")]
    Agent {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReverieError {
    /// Wraps an arbitrary error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ReverieError::Storage {
            source: Box::new(source),
        }
    }

    /// Builds an agent failure from a display-able cause.
    pub fn agent(message: impl Into<String>) -> Self {
        ReverieError::Agent {
            message: message.into(),
            source: None,
        }
    }
}
