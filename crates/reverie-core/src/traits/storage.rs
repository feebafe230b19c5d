// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact store adapter trait.
//!
//! The store is an external collaborator: Reverie ships no persistence
//! engine, only this contract plus in-memory test doubles. Implementations
//! provide their own isolation; embedding writes are allowed to be
//! eventually consistent with entry mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ReverieError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Artifact, ArtifactEntry};

/// Typed CRUD and indexed list queries over artifacts and their entries.
#[async_trait]
pub trait ArtifactStore: PluginAdapter {
    /// Enumerates every user id known to the store.
    async fn list_user_ids(&self) -> Result<Vec<String>, ReverieError>;

    /// Lists all artifacts owned by a user, including reserved ones.
    async fn list_artifacts(&self, user_id: &str) -> Result<Vec<Artifact>, ReverieError>;

    /// Fetches a single artifact by id.
    async fn get_artifact(&self, id: &str) -> Result<Option<Artifact>, ReverieError>;

    /// Creates a new artifact.
    async fn create_artifact(&self, artifact: &Artifact) -> Result<(), ReverieError>;

    /// Replaces an artifact's embedding vector.
    async fn update_artifact_embedding(
        &self,
        id: &str,
        embedding: &[f32],
    ) -> Result<(), ReverieError>;

    /// Lists an artifact's entries, most recent first, optionally capped.
    async fn list_entries(
        &self,
        artifact_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ArtifactEntry>, ReverieError>;

    /// Lists all of a user's entries created strictly after `since`,
    /// across every artifact the user owns, oldest first.
    async fn list_entries_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ArtifactEntry>, ReverieError>;

    /// Appends an entry to its parent artifact and bumps the artifact's
    /// `updated_at` timestamp.
    async fn append_entry(&self, entry: &ArtifactEntry) -> Result<(), ReverieError>;
}
