// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Reverie core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for one streaming chat request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Embedding,
    Agent,
}

// --- Artifact domain types ---

/// A durable, user-owned unit of long-term memory composed of ordered entries.
///
/// The embedding is derived data: it is recomputed asynchronously after entry
/// mutations and may lag behind the entries it summarizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique identifier.
    pub id: String,
    /// Owning user. Artifacts are never shared across users.
    pub user_id: String,
    /// Display title. Titles starting with the reserved `soul:` prefix mark
    /// internal profile artifacts excluded from normal retrieval.
    pub title: String,
    /// Free-text summary of the artifact's contents.
    pub summary: String,
    /// Tag set for coarse categorization.
    pub tags: Vec<String>,
    /// Embedding vector; `None` until first computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp (bumped on entry mutation).
    pub updated_at: DateTime<Utc>,
}

/// One atomic piece of content appended to an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Unique identifier.
    pub id: String,
    /// Parent artifact.
    pub artifact_id: String,
    /// Content text. Edits replace this while preserving identity and order.
    pub content: String,
    /// How this entry was created.
    pub provenance: EntryProvenance,
    /// Optional linkage to the workflow that produced this entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_workflow: Option<String>,
    /// Creation timestamp. Entries are ordered by recency.
    pub created_at: DateTime<Utc>,
}

/// Provenance of an artifact entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryProvenance {
    /// Written directly by the user.
    Manual,
    /// Summarized from a conversation.
    ConversationSummary,
    /// Produced by the distillation batch process.
    Distilled,
}

impl EntryProvenance {
    /// Convert to the wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryProvenance::Manual => "manual",
            EntryProvenance::ConversationSummary => "conversation-summary",
            EntryProvenance::Distilled => "distilled",
        }
    }

    /// Parse from the wire/storage string. Unknown values default to `Manual`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "conversation-summary" => EntryProvenance::ConversationSummary,
            "distilled" => EntryProvenance::Distilled,
            _ => EntryProvenance::Manual,
        }
    }
}

// --- Agent runtime types ---

/// One turn of prior conversation handed to the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

/// A request for one streamed agent turn.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Opaque identifier of the requesting user.
    pub user_id: String,
    /// The user's message for this turn.
    pub message: String,
    /// Recent conversation history, oldest first.
    pub history: Vec<HistoryMessage>,
    /// Pre-formatted memory context to inject, if retrieval selected any.
    pub context: Option<String>,
}

/// Raw events produced by the agent runtime, decoded once at the
/// translator's boundary. All downstream logic pattern-matches on the
/// variant instead of probing optional fields.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A chunk of assistant text. May contain partial reasoning markers.
    TextDelta { text: String },
    /// A tool invocation has started. Runtimes that do not assign call ids
    /// leave `id` empty and the translator synthesizes one.
    ToolCallStarted { id: Option<String>, name: String },
    /// Output for a previously started tool call.
    ToolOutput {
        id: String,
        result: serde_json::Value,
    },
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    /// Texts to embed, one vector produced per text.
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in order.
    pub embeddings: Vec<Vec<f32>>,
    /// Vector dimensionality.
    pub dimensions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn adapter_type_round_trips() {
        for variant in [AdapterType::Storage, AdapterType::Embedding, AdapterType::Agent] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn provenance_wire_strings() {
        assert_eq!(EntryProvenance::Manual.as_str(), "manual");
        assert_eq!(
            EntryProvenance::ConversationSummary.as_str(),
            "conversation-summary"
        );
        assert_eq!(EntryProvenance::Distilled.as_str(), "distilled");
        assert_eq!(
            EntryProvenance::from_str_value("distilled"),
            EntryProvenance::Distilled
        );
        assert_eq!(
            EntryProvenance::from_str_value("conversation-summary"),
            EntryProvenance::ConversationSummary
        );
        // Unknown strings degrade to Manual rather than failing.
        assert_eq!(
            EntryProvenance::from_str_value("imported"),
            EntryProvenance::Manual
        );
    }

    #[test]
    fn provenance_serde_matches_as_str() {
        let json = serde_json::to_string(&EntryProvenance::ConversationSummary).unwrap();
        assert_eq!(json, "\"conversation-summary\"");
        let parsed: EntryProvenance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EntryProvenance::ConversationSummary);
    }

    #[test]
    fn artifact_embedding_skipped_when_absent() {
        let artifact = Artifact {
            id: "a-1".into(),
            user_id: "u-1".into(),
            title: "Q3 Planning".into(),
            summary: "Roadmap and milestones".into(),
            tags: vec!["work".into()],
            embedding: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&artifact).unwrap();
        assert!(!json.contains("embedding"));
    }

    #[test]
    fn health_status_variants() {
        assert_eq!(HealthStatus::Healthy, HealthStatus::Healthy);
        assert_ne!(
            HealthStatus::Degraded("slow".into()),
            HealthStatus::Healthy
        );
    }
}
