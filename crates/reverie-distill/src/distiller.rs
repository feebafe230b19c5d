// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The distillation batch runner.
//!
//! Once per period an external scheduler calls
//! [`Distiller::run_for_all_users`], which folds each user's recent
//! artifact entries into durable insight entries on that user's reserved
//! `soul:insights` artifact. Users are processed with bounded concurrency
//! and every per-user failure is captured in the run result without
//! aborting siblings. Re-running immediately after a successful run
//! produces zero new insights, not an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reverie_config::model::DistillConfig;
use reverie_core::error::ReverieError;
use reverie_core::traits::{ArtifactStore, EmbeddingAdapter};
use reverie_core::types::{Artifact, ArtifactEntry, EntryProvenance};
use reverie_memory::condense::condense_entries;
use reverie_memory::refresh::spawn_embedding_refresh;
use reverie_memory::types::SOUL_ARTIFACT_TITLE;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::types::{DistillationRun, UserError};

/// Folds recent artifact entries into per-user insight entries.
pub struct Distiller {
    store: Arc<dyn ArtifactStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: DistillConfig,
}

impl Distiller {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: DistillConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Run one distillation batch over every known user.
    ///
    /// The outer `Err` is reserved for user enumeration failure; every
    /// per-user fault lands in the run's error list instead.
    pub async fn run_for_all_users(&self) -> Result<DistillationRun, ReverieError> {
        if !self.config.enabled {
            debug!("distillation disabled by config, skipping run");
            return Ok(DistillationRun::default());
        }

        let users = self.store.list_user_ids().await?;
        let concurrency = self.config.concurrency.max(1);

        let results: Vec<(String, Result<usize, ReverieError>)> = stream::iter(users)
            .map(|user_id| async move {
                let outcome = self.distill_user(&user_id).await;
                (user_id, outcome)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut run = DistillationRun::default();
        for (user_id, outcome) in results {
            run.users_processed += 1;
            match outcome {
                Ok(count) => run.total_insights += count,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "distillation failed for user");
                    run.errors.push(UserError {
                        user_id,
                        message: e.to_string(),
                    });
                }
            }
        }

        metrics::counter!("reverie_distill_insights_total")
            .increment(run.total_insights as u64);
        metrics::counter!("reverie_distill_user_errors_total")
            .increment(run.errors.len() as u64);
        info!(
            users_processed = run.users_processed,
            total_insights = run.total_insights,
            errors = run.errors.len(),
            "distillation run complete"
        );
        Ok(run)
    }

    /// Distill one user. Returns the number of insights appended.
    async fn distill_user(&self, user_id: &str) -> Result<usize, ReverieError> {
        let soul = self.find_or_create_soul(user_id).await?;
        let watermark = self.last_distilled_at(&soul.id).await?;

        let new_entries: Vec<ArtifactEntry> = self
            .store
            .list_entries_since(user_id, watermark)
            .await?
            .into_iter()
            .filter(|e| {
                e.artifact_id != soul.id && e.provenance != EntryProvenance::Distilled
            })
            .collect();

        if new_entries.is_empty() {
            debug!(user_id = %user_id, "no new entries since last distillation");
            return Ok(0);
        }

        let insights = condense_entries(&new_entries, self.config.max_insights);
        if insights.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        for insight in &insights {
            self.store
                .append_entry(&ArtifactEntry {
                    id: Uuid::new_v4().to_string(),
                    artifact_id: soul.id.clone(),
                    content: insight.clone(),
                    provenance: EntryProvenance::Distilled,
                    source_workflow: None,
                    created_at: now,
                })
                .await?;
        }

        // The soul artifact's embedding lags its new entries; refresh in
        // the background without holding up the batch.
        let _ = spawn_embedding_refresh(
            Arc::clone(&self.store),
            Arc::clone(&self.embedder),
            soul.id.clone(),
        );

        debug!(user_id = %user_id, count = insights.len(), "appended distilled insights");
        Ok(insights.len())
    }

    /// Newest distilled-entry timestamp on the soul artifact, or the
    /// beginning of time when no distillation has happened yet.
    async fn last_distilled_at(
        &self,
        soul_id: &str,
    ) -> Result<DateTime<Utc>, ReverieError> {
        let entries = self.store.list_entries(soul_id, None).await?;
        Ok(entries
            .iter()
            .filter(|e| e.provenance == EntryProvenance::Distilled)
            .map(|e| e.created_at)
            .max()
            .unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Find the user's reserved soul artifact, creating it on first use.
    async fn find_or_create_soul(&self, user_id: &str) -> Result<Artifact, ReverieError> {
        let artifacts = self.store.list_artifacts(user_id).await?;
        if let Some(soul) = artifacts
            .into_iter()
            .find(|a| a.title == SOUL_ARTIFACT_TITLE)
        {
            return Ok(soul);
        }

        let now = Utc::now();
        let artifact = Artifact {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: SOUL_ARTIFACT_TITLE.to_string(),
            summary: "Durable insights distilled from recent activity.".to_string(),
            tags: vec!["soul".to_string()],
            embedding: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create_artifact(&artifact).await?;
        debug!(user_id = %user_id, artifact_id = %artifact.id, "created soul artifact");
        Ok(artifact)
    }
}
