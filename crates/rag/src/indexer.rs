//! Builds the vector store from the three knowledge sources.
//!
//! Stage order is fixed: curated OS snippets, then user corrections, then
//! successful command history. Everything is embedded into a fresh
//! in-memory store and persisted with one full save at the end, so a
//! failed build never leaves a half-written index behind.

use std::path::PathBuf;

use hindsight_core::{Error, Result};
use tracing::debug;

use crate::embeddings::EmbedClient;
use crate::snippets;
use crate::sources::{CorrectionSource, HistoryEntry, HistorySource};
use crate::store::{Document, Source, VectorStore};

/// How many history entries to consider, newest-first.
const HISTORY_LIMIT: usize = 200;

/// Progress messages are emitted every this many embedded documents;
/// embedding is the slow part of a build.
const PROGRESS_EVERY: usize = 50;

/// Builds the vector store by embedding documents from all knowledge
/// sources.
pub struct Indexer<'a> {
    client: &'a EmbedClient,
    store: VectorStore,
    os: &'static str,
}

impl<'a> Indexer<'a> {
    /// An indexer that will persist to `store_path`, detecting the host OS.
    pub fn new(client: &'a EmbedClient, store_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            store: VectorStore::new(store_path),
            os: std::env::consts::OS,
        }
    }

    /// Override the detected OS token (tests, cross-targeting).
    pub fn with_os(mut self, os: &'static str) -> Self {
        self.os = os;
        self
    }

    /// Embed all knowledge sources and save the vector store. Returns the
    /// total document count. The progress sink receives human-readable
    /// status lines between stages and during long embedding runs.
    ///
    /// A failing corrections or history collaborator is reported and
    /// skipped; a failing embedding call aborts the build with the stage
    /// named in the error. Nothing is persisted unless every stage
    /// completed.
    pub async fn index_all(
        &mut self,
        corrections: &dyn CorrectionSource,
        history: &dyn HistorySource,
        progress: &mut dyn FnMut(&str),
    ) -> Result<usize> {
        progress("Indexing OS command knowledge...");
        let os_docs: Vec<Document> = snippets::for_os(self.os)
            .iter()
            .map(|(text, category)| Document::new(*text, Source::Builtin, *category, Vec::new()))
            .collect();
        let count = os_docs.len();
        self.embed_docs(os_docs, "OS commands", progress).await?;
        progress(&format!("  ✓ {count} OS command entries"));

        progress("Indexing learned corrections...");
        match corrections.corrections() {
            Err(e) => progress(&format!("  ⚠ skipping learned corrections: {e}")),
            Ok(list) if list.is_empty() => progress("  ✓ no learned corrections yet"),
            Ok(list) => {
                let docs: Vec<Document> = list
                    .iter()
                    .map(|c| {
                        Document::new(
                            correction_text(&c.prompt, &c.command),
                            Source::Learned,
                            "learned",
                            Vec::new(),
                        )
                    })
                    .collect();
                let count = docs.len();
                self.embed_docs(docs, "learned corrections", progress).await?;
                progress(&format!("  ✓ {count} learned corrections"));
            }
        }

        progress("Indexing command history...");
        match history.recent(HISTORY_LIMIT) {
            Err(e) => progress(&format!("  ⚠ skipping history: {e}")),
            Ok(entries) => {
                let docs = history_docs(&entries);
                if docs.is_empty() {
                    progress("  ✓ no command history yet");
                } else {
                    let count = docs.len();
                    self.embed_docs(docs, "command history", progress).await?;
                    progress(&format!("  ✓ {count} history entries"));
                }
            }
        }

        progress("Saving vector store...");
        self.store.save().map_err(|e| Error::IndexPersist {
            source: Box::new(e),
        })?;
        progress(&format!("✓ Indexed {} documents total", self.store.len()));

        Ok(self.store.len())
    }

    async fn embed_docs(
        &mut self,
        docs: Vec<Document>,
        stage: &'static str,
        progress: &mut dyn FnMut(&str),
    ) -> Result<()> {
        let total = docs.len();
        for (i, mut doc) in docs.into_iter().enumerate() {
            doc.vector = self
                .client
                .embed(&doc.text)
                .await
                .map_err(|e| Error::IndexEmbed {
                    stage,
                    source: Box::new(e),
                })?;
            self.store.add(doc);

            if (i + 1) % PROGRESS_EVERY == 0 {
                progress(&format!("  embedded {}/{}...", i + 1, total));
            }
        }
        debug!(stage, total, "embedded stage");
        Ok(())
    }
}

/// The text a successful execution is stored under. Shared with the
/// online-learning path so both produce vectors in the same semantic
/// space and dedup works.
pub(crate) fn history_text(prompt: &str, command: &str) -> String {
    format!("'{prompt}' was successfully executed as: {command}")
}

fn correction_text(prompt: &str, command: &str) -> String {
    format!("user correction: when asked '{prompt}', the correct command is '{command}'")
}

/// Convert history entries into documents: successful, fully populated
/// entries only, deduplicated on the exact prompt+command pair.
fn history_docs(entries: &[HistoryEntry]) -> Vec<Document> {
    let mut seen = std::collections::HashSet::new();
    let mut docs = Vec::new();

    for entry in entries {
        if !entry.success || entry.prompt.is_empty() || entry.command.is_empty() {
            continue;
        }
        let key = format!("{}|{}", entry.prompt, entry.command);
        if !seen.insert(key) {
            continue;
        }

        docs.push(Document::new(
            history_text(&entry.prompt, &entry.command),
            Source::History,
            classify_command(&entry.command),
            Vec::new(),
        ));
    }
    docs
}

/// Assign a category to a command by keyword matching; first rule wins.
/// This is what makes the category pre-filter in search useful for
/// history documents.
pub fn classify_command(command: &str) -> &'static str {
    let lower = command.to_lowercase();
    if lower.contains("git ") {
        "git"
    } else if lower.contains("docker") {
        "docker"
    } else if lower.contains("brew ") {
        "packages"
    } else if lower.contains("apt ") || lower.contains("yum ") {
        "packages"
    } else if lower.contains("vm_stat") || lower.contains("free") || lower.contains("memsize") {
        "memory"
    } else if lower.contains("lsof") || lower.contains("netstat") || lower.contains("curl") {
        "network"
    } else if lower.contains("ps ") || lower.contains("kill") || lower.contains("pgrep") {
        "process"
    } else if lower.contains("df ") || lower.contains("du ") || lower.contains("diskutil") {
        "disk"
    } else if lower.contains("find ") || lower.contains("grep ") || lower.contains("chmod") {
        "files"
    } else {
        "general"
    }
}
