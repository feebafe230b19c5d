// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering selected artifacts into the bounded context block injected
//! into a conversation turn.

use std::sync::Arc;

use reverie_core::error::ReverieError;
use reverie_core::traits::ArtifactStore;
use reverie_core::types::{Artifact, ArtifactEntry};
use tracing::debug;

use crate::types::RetrievalCandidate;

const HEADER: &str = "## Relevant Memories\n";

/// A candidate resolved to its full artifact and most recent entries.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub artifact: Artifact,
    /// Most recent first.
    pub entries: Vec<ArtifactEntry>,
}

/// Resolve candidates to full artifacts with their most recent entries,
/// preserving candidate order. Candidates whose artifact has vanished
/// between scoring and resolution are skipped.
pub async fn resolve_candidates(
    store: &Arc<dyn ArtifactStore>,
    candidates: &[RetrievalCandidate],
    entries_per_artifact: usize,
) -> Result<Vec<ResolvedArtifact>, ReverieError> {
    let mut resolved = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Some(artifact) = store.get_artifact(&candidate.artifact_id).await? else {
            debug!(artifact_id = %candidate.artifact_id, "candidate vanished before resolution");
            continue;
        };
        let entries = store
            .list_entries(&artifact.id, Some(entries_per_artifact))
            .await?;
        resolved.push(ResolvedArtifact { artifact, entries });
    }
    Ok(resolved)
}

/// Render selected artifacts into a context block bounded by
/// `char_budget` characters.
///
/// Every selected artifact appears in the output; when the budget is
/// tight, entry content (and in the extreme, titles and summaries) is
/// truncated rather than any artifact being omitted.
pub fn format_for_context(resolved: &[ResolvedArtifact], char_budget: usize) -> String {
    if resolved.is_empty() {
        return String::new();
    }

    let mut out = String::from(HEADER);
    let body_budget = char_budget.saturating_sub(HEADER.chars().count());
    let share = (body_budget / resolved.len()).max(1);

    for item in resolved {
        let mut remaining = share;

        let title_line = format!("### {}\n", item.artifact.title);
        let title_line = truncate_chars(&title_line, remaining);
        remaining = remaining.saturating_sub(title_line.chars().count());
        out.push_str(&title_line);

        if !item.artifact.summary.is_empty() && remaining > 0 {
            let summary = truncate_chars(&item.artifact.summary, remaining.saturating_sub(1));
            remaining = remaining.saturating_sub(summary.chars().count() + 1);
            out.push_str(&summary);
            out.push('\n');
        }

        if item.entries.is_empty() || remaining == 0 {
            continue;
        }
        let per_entry = (remaining / item.entries.len()).max(1);
        for entry in &item.entries {
            if remaining == 0 {
                break;
            }
            // "- " prefix and trailing newline count against the budget.
            let entry_budget = per_entry.min(remaining).saturating_sub(3);
            if entry_budget == 0 {
                break;
            }
            let content = truncate_chars(entry.content.trim(), entry_budget);
            let line = format!("- {content}\n");
            remaining = remaining.saturating_sub(line.chars().count());
            out.push_str(&line);
        }
    }

    truncate_chars(&out, char_budget)
}

/// Truncate a string to at most `max` characters, appending an ellipsis
/// when anything was cut. Always char-boundary safe.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut truncated: String = s.chars().take(max - 1).collect();
    truncated.push('…');
    truncated
}
