// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relevance scoring between a query and candidate artifacts.
//!
//! The scorer is deterministic for identical inputs, bounded to [0, 1],
//! and monotonically non-increasing as unrelated content is appended to a
//! candidate. Artifacts without a usable embedding fall back to a lexical
//! heuristic instead of failing.

use std::collections::BTreeSet;
use std::sync::Arc;

use reverie_core::traits::EmbeddingAdapter;
use reverie_core::types::{Artifact, ArtifactEntry, EmbeddingInput, HistoryMessage};
use tracing::warn;

use crate::types::{artifact_text, cosine_similarity, token_set};

/// Pre-computed features of one retrieval query.
///
/// Built once per `find_candidates` call and scored against every
/// candidate artifact.
#[derive(Debug, Clone)]
pub struct QueryFeatures {
    /// Normalized query text (message plus recent history window).
    pub text: String,
    /// Deduplicated query tokens for the lexical path.
    pub tokens: BTreeSet<String>,
    /// Query embedding; `None` when the embedder is unavailable, which
    /// degrades every comparison to the lexical path.
    pub embedding: Option<Vec<f32>>,
}

/// Computes a confidence score in [0, 1] between a query and an artifact.
pub struct RelevanceScorer {
    embedder: Arc<dyn EmbeddingAdapter>,
}

impl RelevanceScorer {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self { embedder }
    }

    /// Build query features from a message, optionally enriched with the
    /// most recent `history_window` turns.
    ///
    /// An embedding failure is logged and degrades to lexical-only
    /// scoring; it never propagates to the caller.
    pub async fn query_features(
        &self,
        message: &str,
        history: &[HistoryMessage],
        history_window: usize,
    ) -> QueryFeatures {
        let mut text = message.trim().to_string();
        if history_window > 0 {
            let start = history.len().saturating_sub(history_window);
            for turn in &history[start..] {
                text.push('\n');
                text.push_str(turn.content.trim());
            }
        }

        let embedding = match self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.clone()],
            })
            .await
        {
            Ok(output) => output.embeddings.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "query embedding failed, falling back to lexical scoring");
                None
            }
        };

        QueryFeatures {
            tokens: token_set(&text),
            text,
            embedding,
        }
    }

    /// Score one candidate artifact against the query.
    ///
    /// With a usable embedding on both sides the score is cosine
    /// similarity clamped to [0, 1]; otherwise it is the fraction of
    /// query tokens covered by the artifact's title, summary, tags, and
    /// recent entries.
    pub fn score(
        &self,
        query: &QueryFeatures,
        artifact: &Artifact,
        entries: &[ArtifactEntry],
    ) -> f64 {
        if let Some(query_embedding) = &query.embedding {
            if let Some(artifact_embedding) = &artifact.embedding {
                if artifact_embedding.len() == query_embedding.len() {
                    let similarity =
                        cosine_similarity(query_embedding, artifact_embedding);
                    return f64::from(similarity).clamp(0.0, 1.0);
                }
            }
        }
        lexical_coverage(&query.tokens, artifact, entries)
    }
}

/// Fraction of query tokens present in the artifact's text.
///
/// Coverage never increases when unrelated content is appended to the
/// artifact, and an empty query scores 0.
fn lexical_coverage(
    query_tokens: &BTreeSet<String>,
    artifact: &Artifact,
    entries: &[ArtifactEntry],
) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let candidate_tokens = token_set(&artifact_text(artifact, entries));
    let hits = query_tokens
        .iter()
        .filter(|t| candidate_tokens.contains(*t))
        .count();
    hits as f64 / query_tokens.len() as f64
}
