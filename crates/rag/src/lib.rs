//! hindsight-rag: a self-improving local retrieval engine.
//!
//! Powers command suggestion for a natural-language shell assistant.
//! Given a free-form query it returns the previously seen knowledge
//! closest in meaning: curated OS command tips, user-taught corrections,
//! and successful command history. Every success or failure signal from
//! the host updates the store, so retrieval quality improves with use.
//!
//! The pieces, leaf-first: a cosine [`similarity`] primitive; a binary
//! [`store`] with constant-time append; an LRU-cached [`embeddings`]
//! client over Ollama; an [`indexer`] that composes three knowledge
//! sources; and the [`engine`] the host calls on every interaction.

pub mod embeddings;
pub mod engine;
pub mod indexer;
pub mod similarity;
pub mod snippets;
pub mod sources;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export the surface the host application uses.
pub use embeddings::{EmbedClient, EmbeddingProvider, MockProvider, OllamaProvider};
pub use engine::{Engine, DEFAULT_TOP_K, MIN_SCORE, NEAR_DUPLICATE_THRESHOLD};
pub use indexer::Indexer;
pub use sources::{Correction, CorrectionSource, HistoryEntry, HistorySource};
pub use store::{Document, SearchResult, Source, VectorStore};
