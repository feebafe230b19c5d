// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory retrieval gate: scoring, thresholding, ranking, and manual
//! overrides, producing the candidate list for one conversation turn.
//!
//! Two calling conventions share the core algorithm: a high-precision mode
//! (high threshold, at most 2 artifacts) used when auto-injection must
//! rarely be wrong, and a looser assist mode (lower threshold, up to 3,
//! tier-annotated for client display).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reverie_config::model::RetrievalConfig;
use reverie_core::error::ReverieError;
use reverie_core::traits::ArtifactStore;
use reverie_core::types::HistoryMessage;
use tracing::{debug, warn};

use crate::scorer::RelevanceScorer;
use crate::types::{
    CandidateSource, ConfidenceTier, RetrievalCandidate, MAX_CONFIDENCE,
    RESERVED_TITLE_PREFIX,
};

/// Parameters for one candidate search.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    /// Owning user; only their artifacts are considered.
    pub user_id: String,
    /// The incoming message to score against.
    pub message: String,
    /// Recent conversation history, oldest first.
    pub history: Vec<HistoryMessage>,
    /// Artifact ids pinned by the caller, forced to maximum confidence.
    pub manual_ids: Vec<String>,
    /// Hard cap on returned candidates.
    pub max_artifacts: usize,
    /// Minimum confidence for automatic matches.
    pub min_confidence: f64,
}

/// Orchestrates scoring, thresholding, ranking, and manual overrides.
pub struct RetrievalGate {
    store: Arc<dyn ArtifactStore>,
    scorer: RelevanceScorer,
    config: RetrievalConfig,
}

impl RetrievalGate {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        scorer: RelevanceScorer,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            scorer,
            config,
        }
    }

    /// Core candidate search.
    ///
    /// Fetches the user's non-reserved artifacts, scores each against the
    /// history-enriched query, discards scores below `min_confidence`,
    /// merges manual pins at [`MAX_CONFIDENCE`] (deduplicated against auto
    /// matches), sorts by confidence descending with ties broken
    /// manual-first then most-recently-updated, and truncates to
    /// `max_artifacts`.
    pub async fn find_candidates(
        &self,
        request: &RetrievalRequest,
    ) -> Result<Vec<RetrievalCandidate>, ReverieError> {
        let artifacts = self.store.list_artifacts(&request.user_id).await?;
        let query = self
            .scorer
            .query_features(&request.message, &request.history, self.config.history_window)
            .await;

        let mut updated_at: HashMap<String, DateTime<Utc>> = HashMap::new();
        let mut candidates: Vec<RetrievalCandidate> = Vec::new();

        for artifact in &artifacts {
            if artifact.title.starts_with(RESERVED_TITLE_PREFIX) {
                continue;
            }
            let entries = self
                .store
                .list_entries(&artifact.id, Some(self.config.entries_per_artifact))
                .await?;
            let confidence = self.scorer.score(&query, artifact, &entries);
            updated_at.insert(artifact.id.clone(), artifact.updated_at);
            if confidence >= request.min_confidence {
                candidates.push(RetrievalCandidate {
                    artifact_id: artifact.id.clone(),
                    confidence,
                    source: CandidateSource::Auto,
                });
            }
        }

        // Manual pins override auto scores and are always rated at
        // maximum confidence.
        let mut seen_manual: HashSet<&str> = HashSet::new();
        for id in &request.manual_ids {
            if !seen_manual.insert(id.as_str()) {
                continue;
            }
            if let Some(existing) = candidates.iter_mut().find(|c| &c.artifact_id == id) {
                existing.confidence = MAX_CONFIDENCE;
                existing.source = CandidateSource::Manual;
                continue;
            }
            match self.store.get_artifact(id).await? {
                Some(artifact) if artifact.user_id == request.user_id => {
                    updated_at.insert(artifact.id.clone(), artifact.updated_at);
                    candidates.push(RetrievalCandidate {
                        artifact_id: artifact.id,
                        confidence: MAX_CONFIDENCE,
                        source: CandidateSource::Manual,
                    });
                }
                Some(_) => {
                    warn!(artifact_id = %id, "manual pin rejected: artifact belongs to another user");
                }
                None => {
                    debug!(artifact_id = %id, "manual pin skipped: artifact not found");
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| manual_rank(a).cmp(&manual_rank(b)))
                .then_with(|| {
                    let a_updated = updated_at.get(&a.artifact_id);
                    let b_updated = updated_at.get(&b.artifact_id);
                    b_updated.cmp(&a_updated)
                })
                .then_with(|| a.artifact_id.cmp(&b.artifact_id))
        });
        candidates.truncate(request.max_artifacts);

        metrics::counter!("reverie_retrieval_candidates_total")
            .increment(candidates.len() as u64);
        debug!(
            user_id = %request.user_id,
            count = candidates.len(),
            min_confidence = request.min_confidence,
            "retrieval candidates selected"
        );
        Ok(candidates)
    }

    /// High-precision convention: very high threshold, at most 2 artifacts.
    pub async fn find_precision(
        &self,
        user_id: &str,
        message: &str,
        history: &[HistoryMessage],
        manual_ids: &[String],
    ) -> Result<Vec<RetrievalCandidate>, ReverieError> {
        self.find_candidates(&RetrievalRequest {
            user_id: user_id.to_string(),
            message: message.to_string(),
            history: history.to_vec(),
            manual_ids: manual_ids.to_vec(),
            max_artifacts: self.config.precision_max_artifacts,
            min_confidence: self.config.precision_min_confidence,
        })
        .await
    }

    /// Assist convention: lower threshold, up to 3 artifacts, each
    /// annotated with a client-facing confidence tier.
    pub async fn find_assist(
        &self,
        user_id: &str,
        message: &str,
        history: &[HistoryMessage],
        manual_ids: &[String],
    ) -> Result<Vec<(RetrievalCandidate, ConfidenceTier)>, ReverieError> {
        let candidates = self
            .find_candidates(&RetrievalRequest {
                user_id: user_id.to_string(),
                message: message.to_string(),
                history: history.to_vec(),
                manual_ids: manual_ids.to_vec(),
                max_artifacts: self.config.assist_max_artifacts,
                min_confidence: self.config.assist_min_confidence,
            })
            .await?;

        let cutoff = self.config.precision_min_confidence;
        Ok(candidates
            .into_iter()
            .map(|c| {
                let tier = ConfidenceTier::classify(c.confidence, cutoff);
                (c, tier)
            })
            .collect())
    }
}

fn manual_rank(candidate: &RetrievalCandidate) -> u8 {
    match candidate.source {
        CandidateSource::Manual => 0,
        CandidateSource::Auto => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use reverie_core::types::{Artifact, ArtifactEntry, EntryProvenance};
    use reverie_test_utils::{HashEmbedder, MemoryArtifactStore};

    const USER: &str = "u-1";

    async fn seed_artifact(
        store: &MemoryArtifactStore,
        id: &str,
        title: &str,
        summary: &str,
        entry_texts: &[&str],
        updated_offset_secs: i64,
    ) {
        let now = Utc::now();
        store
            .create_artifact(&Artifact {
                id: id.into(),
                user_id: USER.into(),
                title: title.into(),
                summary: summary.into(),
                tags: vec![],
                embedding: None,
                created_at: now,
                updated_at: now + Duration::seconds(updated_offset_secs),
            })
            .await
            .unwrap();
        for (i, text) in entry_texts.iter().enumerate() {
            store
                .append_entry(&ArtifactEntry {
                    id: format!("{id}-e{i}"),
                    artifact_id: id.into(),
                    content: text.to_string(),
                    provenance: EntryProvenance::Manual,
                    source_workflow: None,
                    created_at: now,
                })
                .await
                .unwrap();
        }
    }

    fn gate(store: Arc<MemoryArtifactStore>) -> RetrievalGate {
        RetrievalGate::new(
            store,
            RelevanceScorer::new(Arc::new(HashEmbedder::new())),
            RetrievalConfig::default(),
        )
    }

    async fn fixture() -> (Arc<MemoryArtifactStore>, RetrievalGate) {
        let store = Arc::new(MemoryArtifactStore::new());
        seed_artifact(
            &store,
            "a-roadmap",
            "Q3 Planning",
            "Roadmap and milestones",
            &["remind the team about the Q3 roadmap doc deadlines"],
            0,
        )
        .await;
        seed_artifact(
            &store,
            "a-grocery",
            "Grocery List",
            "Weekly shopping",
            &["buy milk eggs bread and coffee beans"],
            0,
        )
        .await;
        seed_artifact(
            &store,
            "a-soul",
            "soul:insights",
            "Distilled profile",
            &["remind me about the Q3 roadmap doc"],
            0,
        )
        .await;
        let gate = gate(Arc::clone(&store));
        (store, gate)
    }

    fn request(message: &str, max: usize, min: f64) -> RetrievalRequest {
        RetrievalRequest {
            user_id: USER.into(),
            message: message.into(),
            history: vec![],
            manual_ids: vec![],
            max_artifacts: max,
            min_confidence: min,
        }
    }

    #[tokio::test]
    async fn high_precision_scenario() {
        let (_store, gate) = fixture().await;
        let candidates = gate
            .find_candidates(&request("remind me about the Q3 roadmap doc", 2, 0.6))
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1, "only the roadmap artifact should pass");
        assert_eq!(candidates[0].artifact_id, "a-roadmap");
        assert!(candidates[0].confidence >= 0.85);
    }

    #[tokio::test]
    async fn reserved_titles_are_excluded() {
        let (_store, gate) = fixture().await;
        // The soul artifact's entry text matches the query exactly, but it
        // must never surface through automatic retrieval.
        let candidates = gate
            .find_candidates(&request("remind me about the Q3 roadmap doc", 10, 0.0))
            .await
            .unwrap();
        assert!(candidates.iter().all(|c| c.artifact_id != "a-soul"));
    }

    #[tokio::test]
    async fn threshold_filtering_is_monotonic() {
        let (_store, gate) = fixture().await;
        let loose = gate
            .find_candidates(&request("remind me about the Q3 roadmap doc", 10, 0.1))
            .await
            .unwrap();
        let strict = gate
            .find_candidates(&request("remind me about the Q3 roadmap doc", 10, 0.7))
            .await
            .unwrap();
        let loose_ids: Vec<_> = loose.iter().map(|c| c.artifact_id.as_str()).collect();
        for candidate in &strict {
            assert!(
                loose_ids.contains(&candidate.artifact_id.as_str()),
                "strict results must be a subset of loose results"
            );
        }
        assert!(strict.len() <= loose.len());
    }

    #[tokio::test]
    async fn max_artifacts_is_respected_and_sorted() {
        let store = Arc::new(MemoryArtifactStore::new());
        for i in 0..6 {
            seed_artifact(
                &store,
                &format!("a-{i}"),
                &format!("Roadmap notes {i}"),
                "quarterly roadmap review",
                &["the quarterly roadmap review is coming up"],
                i,
            )
            .await;
        }
        let gate = gate(Arc::clone(&store));
        let candidates = gate
            .find_candidates(&request("quarterly roadmap review", 3, 0.1))
            .await
            .unwrap();
        assert_eq!(candidates.len(), 3);
        for pair in candidates.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        // Equal confidence: most recently updated first.
        assert_eq!(candidates[0].artifact_id, "a-5");
    }

    #[tokio::test]
    async fn manual_ids_are_forced_to_max_confidence() {
        let (_store, gate) = fixture().await;
        let mut req = request("remind me about the Q3 roadmap doc", 3, 0.6);
        req.manual_ids = vec!["a-grocery".into(), "a-grocery".into()];
        let candidates = gate.find_candidates(&req).await.unwrap();

        let grocery: Vec<_> = candidates
            .iter()
            .filter(|c| c.artifact_id == "a-grocery")
            .collect();
        assert_eq!(grocery.len(), 1, "manual pins must be deduplicated");
        assert_eq!(grocery[0].confidence, MAX_CONFIDENCE);
        assert_eq!(grocery[0].source, CandidateSource::Manual);
        // Manual pin outranks the auto match.
        assert_eq!(candidates[0].artifact_id, "a-grocery");
    }

    #[tokio::test]
    async fn manual_pin_overrides_auto_match() {
        let (_store, gate) = fixture().await;
        let mut req = request("remind me about the Q3 roadmap doc", 3, 0.6);
        req.manual_ids = vec!["a-roadmap".into()];
        let candidates = gate.find_candidates(&req).await.unwrap();
        let roadmap: Vec<_> = candidates
            .iter()
            .filter(|c| c.artifact_id == "a-roadmap")
            .collect();
        assert_eq!(roadmap.len(), 1);
        assert_eq!(roadmap[0].confidence, MAX_CONFIDENCE);
        assert_eq!(roadmap[0].source, CandidateSource::Manual);
    }

    #[tokio::test]
    async fn unknown_and_foreign_manual_ids_are_skipped() {
        let (store, gate) = fixture().await;
        store
            .create_artifact(&Artifact {
                id: "a-other".into(),
                user_id: "someone-else".into(),
                title: "Private".into(),
                summary: "not yours".into(),
                tags: vec![],
                embedding: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        let mut req = request("remind me about the Q3 roadmap doc", 5, 0.6);
        req.manual_ids = vec!["a-missing".into(), "a-other".into()];
        let candidates = gate.find_candidates(&req).await.unwrap();
        assert!(candidates.iter().all(|c| c.artifact_id != "a-missing"));
        assert!(candidates.iter().all(|c| c.artifact_id != "a-other"));
    }

    #[tokio::test]
    async fn assist_mode_annotates_tiers() {
        let (_store, gate) = fixture().await;
        let annotated = gate
            .find_assist(USER, "remind me about the Q3 roadmap doc", &[], &[])
            .await
            .unwrap();
        assert!(!annotated.is_empty());
        for (candidate, tier) in &annotated {
            if candidate.confidence >= 0.85 {
                assert_eq!(*tier, ConfidenceTier::High);
            } else {
                assert_eq!(*tier, ConfidenceTier::Possible);
            }
        }
    }

    #[tokio::test]
    async fn precision_mode_caps_at_two() {
        let store = Arc::new(MemoryArtifactStore::new());
        for i in 0..4 {
            seed_artifact(
                &store,
                &format!("a-{i}"),
                &format!("Roadmap {i}"),
                "quarterly roadmap review",
                &["quarterly roadmap review notes"],
                i,
            )
            .await;
        }
        let gate = gate(Arc::clone(&store));
        let candidates = gate
            .find_precision(USER, "quarterly roadmap review", &[], &[])
            .await
            .unwrap();
        assert!(candidates.len() <= 2);
    }
}
