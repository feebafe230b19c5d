// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic hashed bag-of-words embedder for tests.
//!
//! Real deployments plug in a model-backed `EmbeddingAdapter`; tests need
//! something fast whose output depends only on the input text. Each token
//! is FNV-1a hashed into a fixed-dimension bucket and the vector is
//! L2-normalized, so texts sharing vocabulary have high cosine similarity.

use async_trait::async_trait;

use reverie_core::error::ReverieError;
use reverie_core::traits::{EmbeddingAdapter, PluginAdapter};
use reverie_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

/// Embedding dimensionality of the test embedder.
pub const HASH_EMBEDDER_DIMS: usize = 128;

/// Deterministic, dependency-free embedding adapter.
#[derive(Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }

    /// Embed a single text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; HASH_EMBEDDER_DIMS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= 2)
        {
            let bucket = fnv1a(&token.to_lowercase()) as usize % HASH_EMBEDDER_DIMS;
            vector[bucket] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

/// FNV-1a over the token bytes. Stable across processes, unlike the
/// standard library's randomly keyed hasher.
fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl PluginAdapter for HashEmbedder {
    fn name(&self) -> &str {
        "hash-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ReverieError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReverieError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for HashEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ReverieError> {
        let embeddings = input
            .texts
            .iter()
            .map(|t| self.embed_text(t))
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: HASH_EMBEDDER_DIMS,
        })
    }
}

/// An embedding adapter that always fails, for exercising degraded paths.
#[derive(Default)]
pub struct FailingEmbedder;

impl FailingEmbedder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ReverieError> {
        Ok(HealthStatus::Unhealthy("always fails".into()))
    }

    async fn shutdown(&self) -> Result<(), ReverieError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, ReverieError> {
        Err(ReverieError::Embedding {
            message: "injected embedder failure".into(),
            source: None,
        })
    }
}
