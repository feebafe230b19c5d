// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory retrieval for Reverie.
//!
//! Decides, per incoming message, which long-term artifacts are relevant
//! enough to inject into the assistant's context.
//!
//! ## Architecture
//!
//! - **RelevanceScorer**: cosine similarity with lexical fallback
//! - **RetrievalGate**: scoring, thresholding, ranking, manual overrides
//! - **context**: candidate resolution and bounded context rendering
//! - **condense**: lexical insight condensation used by distillation
//! - **refresh**: fire-and-forget artifact embedding recomputation
//! - **types**: RetrievalCandidate, ConfidenceTier, reserved-title rules

pub mod condense;
pub mod context;
pub mod gate;
pub mod refresh;
pub mod scorer;
pub mod types;

pub use condense::condense_entries;
pub use context::{format_for_context, resolve_candidates, ResolvedArtifact};
pub use gate::{RetrievalGate, RetrievalRequest};
pub use refresh::spawn_embedding_refresh;
pub use scorer::{QueryFeatures, RelevanceScorer};
pub use types::*;
