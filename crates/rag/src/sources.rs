//! Collaborator contracts consumed during indexing.
//!
//! History and correction storage live outside this engine; the indexer
//! only needs the shapes below. The host application implements these
//! traits over whatever files or databases it keeps, and tests implement
//! them over vectors.

use hindsight_core::Result;

/// One executed command from the host's history log. Fields beyond these
/// three exist in the host's records but are not observed here.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The natural-language request the user typed.
    pub prompt: String,
    /// The shell command that was run for it.
    pub command: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

/// A correction the user explicitly taught ("when I say X, run Y").
#[derive(Debug, Clone)]
pub struct Correction {
    pub prompt: String,
    pub command: String,
}

/// Supplier of recent command history.
pub trait HistorySource {
    /// The most recent `limit` entries, oldest first.
    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;
}

/// Supplier of user-taught corrections.
pub trait CorrectionSource {
    fn corrections(&self) -> Result<Vec<Correction>>;
}
