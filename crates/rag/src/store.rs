//! In-memory vector store backed by a compact binary file.
//!
//! On load the entire file is read into memory; save is a full rewrite and
//! `append` is a constant-time tail write plus a header update. This is fine
//! for the engine's scale (a few thousand documents, ~10 MB on disk).
//!
//! Binary layout, all little-endian (format version 2):
//!
//! ```text
//! [u32] format version = 2
//! [u32] document count = N
//! repeated N times:
//!     [u32] text length;     [.. bytes] text (UTF-8)
//!     [u32] source length;   [.. bytes] source
//!     [u32] category length; [.. bytes] category
//!     [u32] vector dimension
//!     [dim x f32] vector
//!     [i32] success count
//!     [i32] failure count
//! ```
//!
//! The legacy layout (version 1) has no version word and no counters: the
//! first u32 is the document count itself. `load` accepts both; `save`
//! always writes version 2, and `append` upgrades a legacy file in place
//! with a full rewrite.
//!
//! Why binary instead of JSON? A 768-dim float32 vector is 3 KB in binary
//! but roughly double that as decimal text, and parsing needs no
//! string-to-float conversion.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use hindsight_core::{Error, Result};
use tracing::debug;

use crate::similarity::cosine;

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 2;

/// Marker for the headerless legacy layout.
const LEGACY_VERSION: u32 = 1;

/// Byte offset of the document count word in a version-2 file.
const COUNT_OFFSET: u64 = 4;

/// Minimum cosine similarity for a feedback signal to attach to a document.
const FEEDBACK_MATCH_THRESHOLD: f32 = 0.5;

/// Floor for the adaptive multiplier; a document is never zeroed out of
/// ranking entirely, no matter how many failures it has collected.
const MULTIPLIER_FLOOR: f64 = 0.01;

/// Where a document came from. Drives the ranking boost: curated knowledge
/// outranks user-taught corrections, which outrank ambient history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Curated OS command knowledge shipped with the engine.
    Builtin,
    /// A correction the user explicitly taught.
    Learned,
    /// A successfully executed command picked up from history.
    History,
    /// Anything else found on the wire; tolerated, never boosted.
    Other(String),
}

impl Source {
    /// The string written to disk and shown in retrieved context.
    pub fn as_str(&self) -> &str {
        match self {
            Source::Builtin => "builtin",
            Source::Learned => "learned",
            Source::History => "history",
            Source::Other(s) => s,
        }
    }

    fn from_wire(s: String) -> Self {
        match s.as_str() {
            "builtin" => Source::Builtin,
            "learned" => Source::Learned,
            "history" => Source::History,
            _ => Source::Other(s),
        }
    }

    /// Ranking multiplier applied after adaptive scoring.
    fn boost(&self) -> f32 {
        match self {
            Source::Builtin => 1.20,
            Source::Learned => 1.10,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the vector store: the original text, its embedding,
/// and the reinforcement counters the feedback loop maintains.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Original snippet (e.g. "disk usage on macOS: use 'df -h' ...").
    pub text: String,
    /// Origin tag; see [`Source`].
    pub source: Source,
    /// Coarse topical bucket used for search pre-filtering.
    pub category: String,
    /// Embedding vector. All documents in a live store share one dimension.
    pub vector: Vec<f32>,
    /// Times a command retrieved through this document succeeded.
    pub success_count: i32,
    /// Times it failed.
    pub failure_count: i32,
}

impl Document {
    /// A fresh document with zeroed counters.
    pub fn new(
        text: impl Into<String>,
        source: Source,
        category: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            text: text.into(),
            source,
            category: category.into(),
            vector,
            success_count: 0,
            failure_count: 0,
        }
    }
}

/// A document matched by similarity search, with its final score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub doc: Document,
    /// Cosine similarity scaled by the adaptive multiplier and source boost.
    pub score: f32,
}

/// The vector store. Owns its document sequence and its backing file path.
///
/// Not thread-safe by design; the engine is single-threaded per process and
/// concurrent writers are handled at the process level by the host.
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    docs: Vec<Document>,
}

impl VectorStore {
    /// Create an empty store backed by the given path. No file is touched
    /// until `save`, `load`, or `append` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            docs: Vec::new(),
        }
    }

    /// Insert a document in memory only. Call `save` to persist.
    pub fn add(&mut self, doc: Document) {
        self.docs.push(doc);
    }

    /// Number of documents currently in memory.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Write all documents to disk in the current format, replacing any
    /// existing file. The parent directory is created owner-only; the file
    /// itself is created world-inaccessible.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_restricted(parent).map_err(|e| {
                Error::StorageWrite(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let file = create_store_file(&self.path).map_err(|e| {
            Error::StorageWrite(format!("failed to create {}: {e}", self.path.display()))
        })?;
        let mut w = BufWriter::new(file);

        write_u32(&mut w, FORMAT_VERSION)
            .and_then(|_| write_u32(&mut w, self.docs.len() as u32))
            .map_err(|e| Error::StorageWrite(format!("failed to write header: {e}")))?;

        for doc in &self.docs {
            write_document(&mut w, doc)
                .map_err(|e| Error::StorageWrite(format!("failed to write document: {e}")))?;
        }

        w.flush()
            .map_err(|e| Error::StorageWrite(format!("failed to flush store: {e}")))?;

        debug!(count = self.docs.len(), path = %self.path.display(), "saved vector store");
        Ok(())
    }

    /// Read the backing file into memory, replacing the in-memory sequence.
    ///
    /// Both format versions are accepted: if the first word is not the
    /// version marker, it is the document count of a legacy file and the
    /// per-document counters default to zero.
    pub fn load(&mut self) -> Result<()> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::StoreMissing(
                    "no index has been built yet (run the indexer first)".to_string(),
                ));
            }
            Err(e) => {
                return Err(Error::StorageRead(format!(
                    "failed to open {}: {e}",
                    self.path.display()
                )));
            }
        };
        let mut r = BufReader::new(file);

        let first = read_u32(&mut r)
            .map_err(|e| Error::StorageRead(format!("failed to read document count: {e}")))?;
        let (version, count) = if first == FORMAT_VERSION {
            let count = read_u32(&mut r)
                .map_err(|e| Error::StorageRead(format!("failed to read document count: {e}")))?;
            (FORMAT_VERSION, count)
        } else {
            (LEGACY_VERSION, first)
        };

        let mut docs = Vec::new();
        for i in 0..count {
            let doc = read_document(&mut r, version)
                .map_err(|e| Error::StorageRead(format!("document {i}: {e}")))?;
            docs.push(doc);
        }
        self.docs = docs;

        debug!(count, version, path = %self.path.display(), "loaded vector store");
        Ok(())
    }

    /// Persist a single document with a constant-time tail write.
    ///
    /// The document bytes land before the count is bumped, so a crash
    /// between the two writes leaves the file readable at the old count
    /// (the trailing bytes are simply never parsed).
    ///
    /// A missing file falls back to `add` + `save`; a legacy file is
    /// upgraded to the current format with a full rewrite.
    pub fn append(&mut self, doc: Document) -> Result<()> {
        if !self.path.exists() {
            self.add(doc);
            return self.save();
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| {
                Error::StorageWrite(format!(
                    "failed to open {} for append: {e}",
                    self.path.display()
                ))
            })?;

        let first = read_u32(&mut file)
            .map_err(|e| Error::StorageRead(format!("failed to read document count: {e}")))?;
        if first != FORMAT_VERSION {
            drop(file);
            debug!(path = %self.path.display(), "upgrading legacy store on append");
            self.load()?;
            self.add(doc);
            return self.save();
        }

        let count = read_u32(&mut file)
            .map_err(|e| Error::StorageRead(format!("failed to read document count: {e}")))?;

        file.seek(SeekFrom::End(0))
            .map_err(|e| Error::StorageWrite(format!("failed to seek to end: {e}")))?;
        {
            let mut w = BufWriter::new(&mut file);
            write_document(&mut w, &doc)
                .map_err(|e| Error::StorageWrite(format!("failed to append document: {e}")))?;
            w.flush()
                .map_err(|e| Error::StorageWrite(format!("failed to append document: {e}")))?;
        }

        file.seek(SeekFrom::Start(COUNT_OFFSET))
            .map_err(|e| Error::StorageWrite(format!("failed to seek to header: {e}")))?;
        write_u32(&mut file, count + 1)
            .map_err(|e| Error::StorageWrite(format!("failed to update document count: {e}")))?;

        self.docs.push(doc);
        Ok(())
    }

    /// Find the top-k most similar documents to the query vector, ranked by
    /// final score (cosine, scaled by the adaptive multiplier, then the
    /// source boost). Ties keep insertion order.
    ///
    /// A non-empty `category` restricts the search to documents with that
    /// exact category. `top_k == 0` disables truncation and returns every
    /// matching document. No score floor is applied here; callers decide
    /// their own relevance cutoff.
    pub fn search(&self, query: &[f32], top_k: usize, category: &str) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .docs
            .iter()
            .filter(|doc| category.is_empty() || doc.category == category)
            .map(|doc| {
                let c = cosine(query, &doc.vector);
                let score =
                    adaptive_score(c, doc.success_count, doc.failure_count) * doc.source.boost();
                SearchResult {
                    doc: doc.clone(),
                    score,
                }
            })
            .collect();

        // Stable sort: equal scores stay in insertion order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        if top_k > 0 && results.len() > top_k {
            results.truncate(top_k);
        }
        results
    }

    /// True if any stored document's vector is more similar to `vector`
    /// than `threshold`. Semantic dedup, not string dedup: "check disk"
    /// and "show disk usage" land close enough to be recognized as one.
    pub fn has_near_duplicate(&self, vector: &[f32], threshold: f32) -> bool {
        self.docs
            .iter()
            .any(|doc| cosine(vector, &doc.vector) > threshold)
    }

    /// Attach a reinforcement signal to the document most similar to the
    /// query vector. Returns false without touching anything if the store
    /// is empty or the best match is below the 0.5 similarity threshold.
    /// Does not persist; the caller decides whether to `save`.
    pub fn update_score(&mut self, query: &[f32], success: bool) -> bool {
        let mut best: Option<(usize, f32)> = None;
        for (i, doc) in self.docs.iter().enumerate() {
            let sim = cosine(query, &doc.vector);
            if best.map_or(true, |(_, top)| sim > top) {
                best = Some((i, sim));
            }
        }

        match best {
            Some((i, sim)) if sim >= FEEDBACK_MATCH_THRESHOLD => {
                let doc = &mut self.docs[i];
                if success {
                    doc.success_count += 1;
                } else {
                    doc.failure_count += 1;
                }
                true
            }
            _ => false,
        }
    }

    /// Remove the backing file (a best-effort unlink; an already-absent
    /// file is success) and clear the in-memory sequence.
    pub fn flush(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::StorageWrite(format!(
                    "failed to remove {}: {e}",
                    self.path.display()
                )));
            }
        }
        self.docs.clear();
        debug!(path = %self.path.display(), "flushed vector store");
        Ok(())
    }
}

/// Cosine similarity scaled by the bandit-style feedback multiplier.
///
/// The multiplier is `1 + ln(1 + successes) - 0.5 * ln(1 + failures)` in
/// f64, floored at 0.01. Logarithms dampen runaway feedback: going from 10
/// to 100 successes does not multiply the score tenfold.
fn adaptive_score(cosine: f32, success_count: i32, failure_count: i32) -> f32 {
    let mut multiplier =
        1.0 + (1.0 + success_count as f64).ln() - 0.5 * (1.0 + failure_count as f64).ln();
    if multiplier < MULTIPLIER_FLOOR {
        multiplier = MULTIPLIER_FLOOR;
    }
    (cosine as f64 * multiplier) as f32
}

#[cfg(unix)]
fn create_dir_restricted(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_dir_restricted(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

fn create_store_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn write_u32<W: Write>(w: &mut W, value: u32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

fn write_i32<W: Write>(w: &mut W, value: i32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_u32(w, s.len() as u32)?;
    w.write_all(s.as_bytes())
}

fn write_document<W: Write>(w: &mut W, doc: &Document) -> io::Result<()> {
    write_string(w, &doc.text)?;
    write_string(w, doc.source.as_str())?;
    write_string(w, &doc.category)?;
    write_u32(w, doc.vector.len() as u32)?;
    for value in &doc.vector {
        w.write_all(&value.to_le_bytes())?;
    }
    write_i32(w, doc.success_count)?;
    write_i32(w, doc.failure_count)
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(r: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(r: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_string<R: Read>(r: &mut R) -> io::Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn read_document<R: Read>(r: &mut R, version: u32) -> io::Result<Document> {
    let text = read_string(r)?;
    let source = Source::from_wire(read_string(r)?);
    let category = read_string(r)?;

    let dim = read_u32(r)? as usize;
    let mut vector = Vec::with_capacity(dim);
    for _ in 0..dim {
        vector.push(read_f32(r)?);
    }

    let (success_count, failure_count) = if version == FORMAT_VERSION {
        (read_i32(r)?, read_i32(r)?)
    } else {
        (0, 0)
    };

    Ok(Document {
        text,
        source,
        category,
        vector,
        success_count,
        failure_count,
    })
}
