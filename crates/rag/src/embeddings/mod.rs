//! Embedding client with an in-process LRU cache.
//!
//! Every piece of text the engine searches over goes through here. The
//! cache eliminates redundant oracle calls for repeated queries (the same
//! "is chrome running" asked five times costs one round-trip).

pub mod mock;
pub mod ollama;
pub mod provider;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use provider::EmbeddingProvider;

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use hindsight_core::{AppConfig, Result};
use lru::LruCache;

/// Maximum cached embeddings. 100 entries x 768 floats x 4 bytes is about
/// 300 KB, a negligible ceiling that is never persisted.
const CACHE_MAX_ENTRIES: usize = 100;

/// Cached embedding client.
///
/// A hit returns in O(1) and promotes the entry to most recently used; a
/// miss inserts after the provider call succeeds, evicting the least
/// recently used entry once the cache is at capacity.
#[derive(Debug)]
pub struct EmbedClient {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbedClient {
    /// Client talking to the configured Ollama endpoint.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self::with_provider(Arc::new(OllamaProvider::from_config(
            config,
        )?)))
    }

    /// Client over an explicit provider (tests, offline setups).
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let capacity = NonZeroUsize::new(CACHE_MAX_ENTRIES)
            .unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            provider,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Translate text into a vector, consulting the cache first.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(vector) = self.cache.lock().unwrap().get(text) {
            return Ok(vector.clone());
        }

        let vector = self.provider.embed(text).await?;
        self.cache
            .lock()
            .unwrap()
            .put(text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Embed several texts in order, stopping at the first failure.
    /// The oracle has no batch endpoint, so this is the sequential
    /// composition of single calls.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hindsight_core::Error;

    /// Provider that counts how many times the backend is actually hit.
    #[derive(Debug)]
    struct CountingProvider {
        inner: MockProvider,
        calls: Mutex<usize>,
        fail: bool,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                inner: MockProvider::new(32),
                calls: Mutex::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn model_name(&self) -> &str {
            "counting"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(Error::EmbedEmpty);
            }
            self.inner.embed(text).await
        }
    }

    #[tokio::test]
    async fn cache_hit_returns_original_vector_without_backend_call() {
        let provider = Arc::new(CountingProvider::new());
        let client = EmbedClient::with_provider(provider.clone());

        let first = client.embed("check memory").await.unwrap();
        let second = client.embed("check memory").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn overflow_evicts_the_oldest_untouched_entry() {
        let provider = Arc::new(CountingProvider::new());
        let client = EmbedClient::with_provider(provider.clone());

        for i in 0..CACHE_MAX_ENTRIES {
            client.embed(&format!("key-{i}")).await.unwrap();
        }
        client.embed("overflow").await.unwrap();

        // key-0 was the least recently used, so it is gone.
        let calls_before = provider.calls();
        client.embed("key-0").await.unwrap();
        assert_eq!(provider.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn touching_an_entry_saves_it_from_eviction() {
        let provider = Arc::new(CountingProvider::new());
        let client = EmbedClient::with_provider(provider.clone());

        for i in 0..CACHE_MAX_ENTRIES {
            client.embed(&format!("key-{i}")).await.unwrap();
        }
        // Promote key-0, then push one entry past capacity.
        client.embed("key-0").await.unwrap();
        client.embed("overflow").await.unwrap();

        let calls_before = provider.calls();
        client.embed("key-0").await.unwrap();
        assert_eq!(provider.calls(), calls_before, "key-0 should still be cached");

        // key-1 became the oldest and was evicted instead.
        client.embed("key-1").await.unwrap();
        assert_eq!(provider.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn cache_never_exceeds_capacity() {
        let client = EmbedClient::with_provider(Arc::new(CountingProvider::new()));
        for i in 0..(CACHE_MAX_ENTRIES + 50) {
            client.embed(&format!("key-{i}")).await.unwrap();
        }
        assert_eq!(client.cache_len(), CACHE_MAX_ENTRIES);
    }

    #[tokio::test]
    async fn failed_backend_call_caches_nothing() {
        let provider = Arc::new(CountingProvider::failing());
        let client = EmbedClient::with_provider(provider.clone());

        assert!(client.embed("x").await.is_err());
        assert!(client.embed("x").await.is_err());
        assert_eq!(provider.calls(), 2);
        assert_eq!(client.cache_len(), 0);
    }

    #[tokio::test]
    async fn batch_preserves_order_and_aborts_on_first_error() {
        let client = EmbedClient::with_provider(Arc::new(MockProvider::new(32)));
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = client.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[1], client.embed("b").await.unwrap());

        let failing = EmbedClient::with_provider(Arc::new(CountingProvider::failing()));
        assert!(failing.embed_batch(&texts).await.is_err());
    }
}
