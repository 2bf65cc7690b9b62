//! Configuration for the hindsight retrieval engine.
//!
//! Everything is resolved from the environment with sensible local-first
//! defaults; there is no config file. The engine persists exactly one
//! artifact, `vectors.bin`, under a hidden directory in the user's home.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Hidden directory under the home directory that holds engine state.
const DIR_NAME: &str = ".hindsight";

/// File name of the binary vector store inside the config directory.
pub const STORE_FILE_NAME: &str = "vectors.bin";

/// Default Ollama embeddings endpoint.
const DEFAULT_EMBED_URL: &str = "http://localhost:11434/api/embeddings";

/// Default embedding model. nomic-embed-text produces 768-dimensional
/// vectors and runs locally.
const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Resolved runtime settings for the engine.
///
/// Production code builds this once via [`AppConfig::load`] and threads it
/// through engine construction. Tests bypass it entirely by constructing
/// stores and clients with explicit paths and providers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding engine state (`~/.hindsight` unless overridden).
    pub config_dir: PathBuf,

    /// Embedding endpoint URL.
    pub embed_url: String,

    /// Embedding model name.
    pub embed_model: String,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Recognized variables:
    /// - `HINDSIGHT_CONFIG_DIR`: overrides the state directory
    /// - `HINDSIGHT_EMBED_URL`: overrides the embedding endpoint
    /// - `HINDSIGHT_EMBED_MODEL`: overrides the embedding model
    pub fn load() -> Result<Self> {
        let config_dir = match std::env::var_os("HINDSIGHT_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|home| home.join(DIR_NAME))
                .ok_or_else(|| Error::Config("could not determine home directory".to_string()))?,
        };

        let embed_url = std::env::var("HINDSIGHT_EMBED_URL")
            .unwrap_or_else(|_| DEFAULT_EMBED_URL.to_string());
        let embed_model = std::env::var("HINDSIGHT_EMBED_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());

        Ok(Self {
            config_dir,
            embed_url,
            embed_model,
        })
    }

    /// Full path to the binary vector store.
    pub fn store_path(&self) -> PathBuf {
        self.config_dir.join(STORE_FILE_NAME)
    }
}
