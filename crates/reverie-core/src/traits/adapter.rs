// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait implemented by all external collaborators.

use async_trait::async_trait;

use crate::error::ReverieError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Reverie adapters.
///
/// Every collaborator (store, embedder, agent runtime) implements this
/// trait, which provides identity, health check, and shutdown.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the type of adapter (storage, embedding, agent).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, ReverieError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), ReverieError>;
}
