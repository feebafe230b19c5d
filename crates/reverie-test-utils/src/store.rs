// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory artifact store for deterministic testing.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use reverie_core::error::ReverieError;
use reverie_core::traits::{ArtifactStore, PluginAdapter};
use reverie_core::types::{AdapterType, Artifact, ArtifactEntry, HealthStatus};

/// An `ArtifactStore` backed by process memory.
///
/// Iteration order is normalized (sorted by id or timestamp) so tests see
/// deterministic results regardless of map internals.
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: DashMap<String, Artifact>,
    entries: DashMap<String, Vec<ArtifactEntry>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for MemoryArtifactStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReverieError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReverieError> {
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn list_user_ids(&self) -> Result<Vec<String>, ReverieError> {
        let mut ids: Vec<String> = self
            .artifacts
            .iter()
            .map(|a| a.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_artifacts(&self, user_id: &str) -> Result<Vec<Artifact>, ReverieError> {
        let mut artifacts: Vec<Artifact> = self
            .artifacts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.clone())
            .collect();
        artifacts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(artifacts)
    }

    async fn get_artifact(&self, id: &str) -> Result<Option<Artifact>, ReverieError> {
        Ok(self.artifacts.get(id).map(|a| a.clone()))
    }

    async fn create_artifact(&self, artifact: &Artifact) -> Result<(), ReverieError> {
        self.artifacts
            .insert(artifact.id.clone(), artifact.clone());
        self.entries.entry(artifact.id.clone()).or_default();
        Ok(())
    }

    async fn update_artifact_embedding(
        &self,
        id: &str,
        embedding: &[f32],
    ) -> Result<(), ReverieError> {
        let mut artifact = self
            .artifacts
            .get_mut(id)
            .ok_or_else(|| ReverieError::NotFound {
                kind: "artifact",
                id: id.to_string(),
            })?;
        artifact.embedding = Some(embedding.to_vec());
        Ok(())
    }

    async fn list_entries(
        &self,
        artifact_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ArtifactEntry>, ReverieError> {
        let mut entries = self
            .entries
            .get(artifact_id)
            .map(|e| e.clone())
            .unwrap_or_default();
        // Most recent first, stable across runs.
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn list_entries_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ArtifactEntry>, ReverieError> {
        let artifact_ids: Vec<String> = self
            .artifacts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.id.clone())
            .collect();

        let mut result: Vec<ArtifactEntry> = Vec::new();
        for id in artifact_ids {
            if let Some(entries) = self.entries.get(&id) {
                result.extend(entries.iter().filter(|e| e.created_at > since).cloned());
            }
        }
        // Oldest first.
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn append_entry(&self, entry: &ArtifactEntry) -> Result<(), ReverieError> {
        if !self.artifacts.contains_key(&entry.artifact_id) {
            return Err(ReverieError::NotFound {
                kind: "artifact",
                id: entry.artifact_id.clone(),
            });
        }
        self.entries
            .entry(entry.artifact_id.clone())
            .or_default()
            .push(entry.clone());
        if let Some(mut artifact) = self.artifacts.get_mut(&entry.artifact_id) {
            if entry.created_at > artifact.updated_at {
                artifact.updated_at = entry.created_at;
            }
        }
        Ok(())
    }
}

/// A store wrapper that injects failures for selected users, for testing
/// per-user error isolation.
pub struct FailingStore {
    inner: MemoryArtifactStore,
    fail_users: HashSet<String>,
}

impl FailingStore {
    pub fn wrapping(inner: MemoryArtifactStore) -> Self {
        Self {
            inner,
            fail_users: HashSet::new(),
        }
    }

    /// Make every user-scoped operation for `user_id` fail.
    pub fn fail_for_user(mut self, user_id: &str) -> Self {
        self.fail_users.insert(user_id.to_string());
        self
    }

    fn check(&self, user_id: &str) -> Result<(), ReverieError> {
        if self.fail_users.contains(user_id) {
            return Err(ReverieError::storage(std::io::Error::other(format!(
                "injected failure for user {user_id}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for FailingStore {
    fn name(&self) -> &str {
        "failing-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReverieError> {
        Ok(HealthStatus::Degraded("failure injection active".into()))
    }

    async fn shutdown(&self) -> Result<(), ReverieError> {
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FailingStore {
    async fn list_user_ids(&self) -> Result<Vec<String>, ReverieError> {
        self.inner.list_user_ids().await
    }

    async fn list_artifacts(&self, user_id: &str) -> Result<Vec<Artifact>, ReverieError> {
        self.check(user_id)?;
        self.inner.list_artifacts(user_id).await
    }

    async fn get_artifact(&self, id: &str) -> Result<Option<Artifact>, ReverieError> {
        self.inner.get_artifact(id).await
    }

    async fn create_artifact(&self, artifact: &Artifact) -> Result<(), ReverieError> {
        self.check(&artifact.user_id)?;
        self.inner.create_artifact(artifact).await
    }

    async fn update_artifact_embedding(
        &self,
        id: &str,
        embedding: &[f32],
    ) -> Result<(), ReverieError> {
        self.inner.update_artifact_embedding(id, embedding).await
    }

    async fn list_entries(
        &self,
        artifact_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ArtifactEntry>, ReverieError> {
        self.inner.list_entries(artifact_id, limit).await
    }

    async fn list_entries_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ArtifactEntry>, ReverieError> {
        self.check(user_id)?;
        self.inner.list_entries_since(user_id, since).await
    }

    async fn append_entry(&self, entry: &ArtifactEntry) -> Result<(), ReverieError> {
        self.inner.append_entry(entry).await
    }
}
