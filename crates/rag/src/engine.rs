//! Retrieval and feedback entry points.
//!
//! This is the surface the host application talks to on every interaction:
//! retrieve context before translating a query, then report what happened
//! afterwards so the store quietly improves. The write paths run in
//! fire-and-forget workers on the host side; here they enforce their own
//! deadline and swallow every error, because nothing in this module is
//! allowed to degrade the user's command.

use std::path::PathBuf;
use std::time::Duration;

use hindsight_core::{AppConfig, Result};
use tracing::debug;

use crate::embeddings::EmbedClient;
use crate::indexer::history_text;
use crate::store::{Document, SearchResult, Source, VectorStore};

/// How many documents to retrieve per query. Five gives enough context
/// without bloating the prompt.
pub const DEFAULT_TOP_K: usize = 5;

/// Minimum final score for a result to be injected as context.
pub const MIN_SCORE: f32 = 0.3;

/// Cosine similarity above which two vectors count as the same knowledge.
/// High enough to merge "check disk" with "show disk usage", low enough to
/// keep genuinely different commands apart.
pub const NEAR_DUPLICATE_THRESHOLD: f32 = 0.95;

/// Hard deadline for the online-learning paths. Typical time is ~300 ms;
/// if the embedding service is wedged we abandon the learning opportunity
/// rather than outlive the user's command.
const ONLINE_DEADLINE: Duration = Duration::from_secs(5);

/// The retrieval and feedback engine.
///
/// Holds the embedding client and the store path; the store itself is
/// loaded fresh from disk on every call so concurrent workers always see
/// the latest persisted state.
#[derive(Debug)]
pub struct Engine {
    client: EmbedClient,
    store_path: PathBuf,
}

impl Engine {
    /// Engine over the configured Ollama endpoint and store location.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: EmbedClient::new(config)?,
            store_path: config.store_path(),
        })
    }

    /// Engine over an explicit client and store path (tests, embedded use).
    pub fn with_client(client: EmbedClient, store_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            store_path: store_path.into(),
        }
    }

    /// The embedding client, shared so an index build reuses the cache.
    pub fn client(&self) -> &EmbedClient {
        &self.client
    }

    /// Retrieve knowledge relevant to a query, formatted for injection
    /// into the translation model's system prompt.
    ///
    /// Never fails: a missing index, an unreachable embedding service, or
    /// any storage error yields the empty string and the caller proceeds
    /// unaided.
    pub async fn retrieve(&self, query: &str) -> String {
        let mut store = VectorStore::new(&self.store_path);
        if let Err(e) = store.load() {
            debug!(error = %e, "retrieval degraded to empty context");
            return String::new();
        }

        let query_vec = match self.client.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "retrieval degraded to empty context");
                return String::new();
            }
        };

        let results = store.search(&query_vec, DEFAULT_TOP_K, "");
        let relevant: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| r.score >= MIN_SCORE)
            .collect();
        if relevant.is_empty() {
            return String::new();
        }

        format_context(&relevant)
    }

    /// Record a successful prompt-to-command translation as new knowledge,
    /// unless a near-duplicate is already stored.
    ///
    /// Silent on every failure; bounded by a five-second deadline.
    pub async fn learn_from_success(&self, prompt: &str, command: &str, category: &str) {
        let work = self.learn_inner(prompt, command, category);
        if tokio::time::timeout(ONLINE_DEADLINE, work).await.is_err() {
            debug!("learn-from-success hit its deadline");
        }
    }

    async fn learn_inner(&self, prompt: &str, command: &str, category: &str) {
        // Compose the text exactly like the indexer's history stage does,
        // so the vectors live in the same semantic space and dedup works.
        let text = history_text(prompt, command);

        let vector = match self.client.embed(&text).await {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "skipping learn opportunity");
                return;
            }
        };

        let mut store = VectorStore::new(&self.store_path);
        if store.load().is_err() {
            // No index yet; nothing to extend.
            return;
        }

        if store.has_near_duplicate(&vector, NEAR_DUPLICATE_THRESHOLD) {
            debug!("near-duplicate suppressed");
            return;
        }

        let doc = Document::new(text, Source::History, category, vector);
        if let Err(e) = store.append(doc) {
            debug!(error = %e, "failed to append learned document");
        }
    }

    /// Attach a success or failure signal to the stored document closest
    /// to the user's prompt, reranking future retrievals.
    ///
    /// The raw prompt is embedded, not the composed history text: the
    /// target is the document that would have been retrieved.
    ///
    /// Silent on every failure; bounded by a five-second deadline.
    pub async fn record_feedback(&self, prompt: &str, success: bool) {
        let work = self.feedback_inner(prompt, success);
        if tokio::time::timeout(ONLINE_DEADLINE, work).await.is_err() {
            debug!("record-feedback hit its deadline");
        }
    }

    async fn feedback_inner(&self, prompt: &str, success: bool) {
        let vector = match self.client.embed(prompt).await {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "skipping feedback signal");
                return;
            }
        };

        let mut store = VectorStore::new(&self.store_path);
        if store.load().is_err() {
            return;
        }

        if !store.update_score(&vector, success) {
            return;
        }

        if let Err(e) = store.save() {
            debug!(error = %e, "failed to persist feedback");
        }
    }
}

/// Turn search results into the context block injected into the system
/// prompt, highest score first.
fn format_context(results: &[SearchResult]) -> String {
    let mut out = String::from("\nRelevant knowledge (use this to pick the right command):\n");
    for r in results {
        out.push_str(&format!("- [{}] {}\n", r.doc.source, r.doc.text));
    }
    out
}
