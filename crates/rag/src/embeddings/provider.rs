//! Embedding provider trait.
//!
//! The seam between the cached client and concrete backends, so tests and
//! air-gapped setups can swap the remote oracle for a deterministic one.

use hindsight_core::Result;

/// A backend that turns text into fixed-dimension embedding vectors.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Model identifier, reported in errors and logs.
    fn model_name(&self) -> &str;

    /// Translate a single text into an embedding vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
