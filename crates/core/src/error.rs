//! Error types for the hindsight retrieval engine.
//!
//! One unified enum covers both halves of the engine: the vector store
//! (missing / read / write) and the embedding client (unreachable /
//! model missing / protocol / timeout / empty), plus the two composite
//! failures the indexer can surface.

use thiserror::Error;

/// Unified error type for the retrieval engine.
///
/// Storage and embedding failures are kept as distinct variants because
/// callers route them differently: a foreground index build propagates
/// everything to the user, while the retrieval and feedback paths swallow
/// all of them and degrade to an empty result.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing store file does not exist yet. Carries an advisory
    /// message so callers can tell the user how to create it.
    #[error("vector store not found: {0}")]
    StoreMissing(String),

    /// Reading or parsing the backing store failed.
    #[error("failed to read vector store: {0}")]
    StorageRead(String),

    /// Creating, writing, seeking, or removing the backing store failed.
    #[error("failed to write vector store: {0}")]
    StorageWrite(String),

    /// Could not open a connection to the embedding endpoint.
    #[error("could not reach embedding service at {endpoint} (is it running? start with: ollama serve)")]
    EmbedServiceUnreachable { endpoint: String },

    /// The endpoint answered, but it does not know the requested model.
    #[error("embedding model '{model}' is not installed (run: ollama pull {model})")]
    EmbedModelMissing { model: String },

    /// Malformed response body or an unexpected status code.
    #[error("embedding service error: {0}")]
    EmbedProtocol(String),

    /// The request exceeded its deadline.
    #[error("embedding request timed out")]
    EmbedTimeout,

    /// A syntactically valid response whose embedding array was empty.
    #[error("empty embedding returned (model may not support embeddings)")]
    EmbedEmpty,

    /// An embedding call failed while indexing the named stage.
    #[error("failed to index {stage}: {source}")]
    IndexEmbed {
        stage: &'static str,
        source: Box<Error>,
    },

    /// The final save of a freshly built index failed.
    #[error("failed to save vector store after indexing: {source}")]
    IndexPersist { source: Box<Error> },

    /// Configuration could not be resolved (no home directory, bad filter).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_actionable_guidance() {
        let err = Error::EmbedModelMissing {
            model: "nomic-embed-text".to_string(),
        };
        assert!(err.to_string().contains("ollama pull nomic-embed-text"));

        let err = Error::EmbedServiceUnreachable {
            endpoint: "http://localhost:11434/api/embeddings".to_string(),
        };
        assert!(err.to_string().contains("ollama serve"));
    }

    #[test]
    fn index_errors_name_their_stage() {
        let err = Error::IndexEmbed {
            stage: "OS commands",
            source: Box::new(Error::EmbedTimeout),
        };
        let msg = err.to_string();
        assert!(msg.contains("OS commands"));
        assert!(msg.contains("timed out"));
    }
}
