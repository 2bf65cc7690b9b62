//! Deterministic offline embedding provider.
//!
//! Hashes word tokens into a fixed number of dimensions and normalizes the
//! result. Not semantically meaningful like a real model, but deterministic
//! and content-dependent: identical texts map to identical vectors, which is
//! exactly what the dedup and caching tests need.

use hindsight_core::Result;

use crate::embeddings::provider::EmbeddingProvider;

#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn project(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text.to_lowercase().split_whitespace() {
            let hash = token
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            vector[(hash as usize) % self.dimensions] += 1.0;

            // Spread each token over a second dimension so short texts
            // still produce distinguishable directions.
            let spread = hash.rotate_left(17);
            vector[(spread as usize) % self.dimensions] += 0.5;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.project(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_texts_map_to_identical_vectors() {
        let provider = MockProvider::new(64);
        let a = provider.embed("check disk space").await.unwrap();
        let b = provider.embed("check disk space").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_texts_diverge() {
        let provider = MockProvider::new(64);
        let a = provider.embed("check disk space").await.unwrap();
        let b = provider.embed("kill the server process").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn output_is_unit_length() {
        let provider = MockProvider::new(64);
        let v = provider.embed("show open network ports").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn empty_text_is_a_zero_vector() {
        let provider = MockProvider::new(64);
        let v = provider.embed("").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }
}
