// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval domain types and shared text/vector helpers.

use std::collections::BTreeSet;

use reverie_core::types::{Artifact, ArtifactEntry};
use serde::{Deserialize, Serialize};

/// Confidence assigned to manually pinned artifacts.
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Title prefix marking internal per-user profile artifacts.
///
/// Artifacts whose titles start with this prefix are excluded from
/// automatic retrieval.
pub const RESERVED_TITLE_PREFIX: &str = "soul:";

/// Title of the per-user artifact that accumulates distilled insights.
pub const SOUL_ARTIFACT_TITLE: &str = "soul:insights";

/// How a retrieval candidate was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Selected by the relevance scorer.
    Auto,
    /// Pinned by the caller via `manual_ids`.
    Manual,
}

/// A scored artifact selected for context injection. Transient, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    /// The selected artifact.
    pub artifact_id: String,
    /// Confidence score in [0, 1].
    pub confidence: f64,
    /// How the candidate was selected.
    pub source: CandidateSource,
}

/// Client-facing confidence annotation used by the assist convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Possible,
}

impl ConfidenceTier {
    /// Classify a confidence score against the high-precision cutoff.
    pub fn classify(confidence: f64, high_cutoff: f64) -> Self {
        if confidence >= high_cutoff {
            ConfidenceTier::High
        } else {
            ConfidenceTier::Possible
        }
    }
}

/// An artifact that was auto-injected into the turn, reported on the
/// stream's `done` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectedArtifact {
    pub id: String,
    pub title: String,
    pub confidence: ConfidenceTier,
}

/// Compute cosine similarity between two vectors of equal length.
///
/// Returns 0.0 when either vector has zero magnitude. Callers are expected
/// to check dimensions before calling; mismatched lengths compare only the
/// shared prefix of neither, i.e. the caller bug surfaces as 0.0 rather
/// than a panic mid-request.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Lowercased alphanumeric tokens of length >= 2, deduplicated.
pub fn token_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_lowercase())
        .collect()
}

/// The canonical text rendering of an artifact used for scoring and for
/// embedding refresh: title, summary, tags, then entry contents.
pub fn artifact_text(artifact: &Artifact, entries: &[ArtifactEntry]) -> String {
    let mut text = String::new();
    text.push_str(&artifact.title);
    text.push('\n');
    text.push_str(&artifact.summary);
    for tag in &artifact.tags {
        text.push('\n');
        text.push_str(tag);
    }
    for entry in entries {
        text.push('\n');
        text.push_str(&entry.content);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn artifact(title: &str, summary: &str, tags: &[&str]) -> Artifact {
        Artifact {
            id: "a-1".into(),
            user_id: "u-1".into(),
            title: title.into(),
            summary: summary.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            embedding: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cosine_similarity_identical() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_mismatched_lengths_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_similarity_zero_vector_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn token_set_normalizes_and_dedupes() {
        let tokens = token_set("Remind me about the Q3 roadmap, the Q3 ROADMAP doc!");
        assert!(tokens.contains("q3"));
        assert!(tokens.contains("roadmap"));
        assert!(tokens.contains("doc"));
        // Single-character fragments are dropped.
        assert!(!tokens.contains("a"));
        // Deduplicated: "q3" appears once regardless of repetition.
        assert_eq!(tokens.iter().filter(|t| *t == "q3").count(), 1);
    }

    #[test]
    fn artifact_text_includes_all_fields() {
        let a = artifact("Q3 Planning", "Roadmap and milestones", &["work", "planning"]);
        let text = artifact_text(&a, &[]);
        assert!(text.contains("Q3 Planning"));
        assert!(text.contains("milestones"));
        assert!(text.contains("work"));
    }

    #[test]
    fn confidence_tier_classification() {
        assert_eq!(ConfidenceTier::classify(0.9, 0.85), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::classify(0.85, 0.85), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::classify(0.7, 0.85), ConfidenceTier::Possible);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConfidenceTier::High).unwrap(),
            "\"high\""
        );
        assert_eq!(
            serde_json::to_string(&ConfidenceTier::Possible).unwrap(),
            "\"possible\""
        );
    }
}
