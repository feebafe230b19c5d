// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget artifact embedding refresh.
//!
//! An artifact's embedding is derived data, recomputed after any entry is
//! added or edited. The triggering request never waits on the refresh and
//! never observes its failure; errors feed the log sink only. Retrieval
//! performed before the refresh lands simply uses the stale embedding.

use std::sync::Arc;

use reverie_core::error::ReverieError;
use reverie_core::traits::{ArtifactStore, EmbeddingAdapter};
use reverie_core::types::EmbeddingInput;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::artifact_text;

/// Entries folded into the embedding text. Older entries contribute little
/// and keeping the input bounded keeps refresh latency flat.
const EMBED_ENTRY_LIMIT: usize = 20;

/// Detach a background task that recomputes one artifact's embedding.
///
/// Returns the join handle so tests can await completion; production
/// callers drop it.
pub fn spawn_embedding_refresh(
    store: Arc<dyn ArtifactStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    artifact_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match refresh_embedding(&store, &embedder, &artifact_id).await {
            Ok(()) => {
                debug!(artifact_id = %artifact_id, "artifact embedding refreshed");
            }
            Err(e) => {
                warn!(artifact_id = %artifact_id, error = %e, "embedding refresh failed");
            }
        }
    })
}

async fn refresh_embedding(
    store: &Arc<dyn ArtifactStore>,
    embedder: &Arc<dyn EmbeddingAdapter>,
    artifact_id: &str,
) -> Result<(), ReverieError> {
    let artifact = store
        .get_artifact(artifact_id)
        .await?
        .ok_or_else(|| ReverieError::NotFound {
            kind: "artifact",
            id: artifact_id.to_string(),
        })?;
    let entries = store
        .list_entries(artifact_id, Some(EMBED_ENTRY_LIMIT))
        .await?;

    let text = artifact_text(&artifact, &entries);
    let output = embedder
        .embed(EmbeddingInput { texts: vec![text] })
        .await?;
    let embedding = output
        .embeddings
        .into_iter()
        .next()
        .ok_or_else(|| ReverieError::Internal("embedder returned no vectors".to_string()))?;

    store
        .update_artifact_embedding(artifact_id, &embedding)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reverie_core::types::{Artifact, ArtifactEntry, EntryProvenance};
    use reverie_test_utils::{HashEmbedder, MemoryArtifactStore};

    async fn seeded_store() -> Arc<MemoryArtifactStore> {
        let store = Arc::new(MemoryArtifactStore::new());
        let now = Utc::now();
        store
            .create_artifact(&Artifact {
                id: "a-1".into(),
                user_id: "u-1".into(),
                title: "Q3 Planning".into(),
                summary: "Roadmap".into(),
                tags: vec![],
                embedding: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        store
            .append_entry(&ArtifactEntry {
                id: "e-1".into(),
                artifact_id: "a-1".into(),
                content: "ship the roadmap doc".into(),
                provenance: EntryProvenance::Manual,
                source_workflow: None,
                created_at: now,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn refresh_writes_embedding() {
        let store = seeded_store().await;
        let embedder = Arc::new(HashEmbedder::new());
        let handle = spawn_embedding_refresh(
            Arc::clone(&store) as Arc<dyn ArtifactStore>,
            embedder,
            "a-1".to_string(),
        );
        handle.await.unwrap();

        let artifact = store.get_artifact("a-1").await.unwrap().unwrap();
        let embedding = artifact.embedding.expect("embedding should be written");
        assert!(!embedding.is_empty());
    }

    #[tokio::test]
    async fn refresh_of_missing_artifact_only_logs() {
        let store = Arc::new(MemoryArtifactStore::new());
        let embedder = Arc::new(HashEmbedder::new());
        let handle = spawn_embedding_refresh(
            Arc::clone(&store) as Arc<dyn ArtifactStore>,
            embedder,
            "nope".to_string(),
        );
        // The task completes without panicking; the error went to the log.
        handle.await.unwrap();
    }
}
