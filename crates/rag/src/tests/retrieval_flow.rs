//! Full-loop test: index, retrieve, learn online, record feedback, and
//! watch the feedback change the ranking.

use std::collections::HashMap;
use std::sync::Arc;

use hindsight_core::{Error, Result};
use tempfile::TempDir;

use crate::embeddings::{EmbedClient, EmbeddingProvider};
use crate::engine::Engine;
use crate::indexer::Indexer;
use crate::sources::{Correction, CorrectionSource, HistoryEntry, HistorySource};
use crate::store::VectorStore;

/// Maps exact texts to hand-picked vectors so the test controls the
/// cosine geometry end to end. Unknown text is an error, which doubles
/// as a check that only expected texts are embedded.
#[derive(Debug)]
struct FixtureProvider {
    vectors: HashMap<String, Vec<f32>>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FixtureProvider {
    fn model_name(&self) -> &str {
        "fixture"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| Error::EmbedProtocol(format!("no fixture for {text:?}")))
    }
}

struct NoCorrections;
impl CorrectionSource for NoCorrections {
    fn corrections(&self) -> Result<Vec<Correction>> {
        Ok(vec![])
    }
}

struct OneHistoryEntry;
impl HistorySource for OneHistoryEntry {
    fn recent(&self, _limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(vec![HistoryEntry {
            prompt: "show disk usage".to_string(),
            command: "df -h".to_string(),
            success: true,
        }])
    }
}

#[tokio::test]
async fn index_retrieve_learn_feedback_loop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vectors.bin");

    // Geometry: the Linux snippet list plus one history doc. The memory
    // snippet sits on the x axis, the history doc on the y axis, the
    // rest far away in the remaining dimensions.
    let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
    let snippet_list = crate::snippets::for_os("linux");
    for (i, (text, _)) in snippet_list.iter().enumerate() {
        let mut v = vec![0.0f32; 8];
        if text.contains("memory") {
            v[0] = 1.0;
        } else {
            v[2 + (i % 6)] = 1.0;
        }
        vectors.insert(text.to_string(), v);
    }
    let history_doc_text = "'show disk usage' was successfully executed as: df -h";
    let mut y = vec![0.0f32; 8];
    y[1] = 1.0;
    vectors.insert(history_doc_text.to_string(), y.clone());

    // Queries and the online-learning texts seen later.
    vectors.insert("how much RAM is free".to_string(), {
        let mut v = vec![0.0f32; 8];
        v[0] = 0.95;
        v[1] = 0.05;
        v
    });
    vectors.insert("check disk space".to_string(), {
        let mut v = vec![0.0f32; 8];
        v[1] = 0.9;
        v[0] = 0.1;
        v
    });
    vectors.insert(
        "'check disk space' was successfully executed as: df -h".to_string(),
        {
            // Close enough to the stored history doc to be a near-duplicate.
            let mut v = vec![0.0f32; 8];
            v[1] = 0.99;
            v[0] = 0.01;
            v
        },
    );

    let client = EmbedClient::with_provider(Arc::new(FixtureProvider { vectors }));

    // Build the index from all three sources.
    let mut indexer = Indexer::new(&client, &path).with_os("linux");
    let mut messages = Vec::new();
    let total = indexer
        .index_all(&NoCorrections, &OneHistoryEntry, &mut |m| {
            messages.push(m.to_string())
        })
        .await
        .unwrap();
    assert_eq!(total, snippet_list.len() + 1);

    let engine = Engine::with_client(client, &path);

    // Retrieval finds the memory snippet for a memory question.
    let context = engine.retrieve("how much RAM is free").await;
    assert!(context.starts_with("\nRelevant knowledge"));
    assert!(context.contains("free -h"));
    assert!(context.contains("[builtin]"));

    // A successful execution that near-duplicates stored knowledge is
    // suppressed; the store does not grow.
    engine
        .learn_from_success("check disk space", "df -h", "disk")
        .await;
    let mut store = VectorStore::new(&path);
    store.load().unwrap();
    assert_eq!(store.len(), total);

    // Feedback attaches to the history doc (the best match for the raw
    // prompt) and persists.
    engine.record_feedback("check disk space", true).await;
    engine.record_feedback("check disk space", true).await;
    store.load().unwrap();
    let disk_docs = store.search(&y, 1, "");
    assert_eq!(disk_docs[0].doc.text, history_doc_text);
    assert_eq!(disk_docs[0].doc.success_count, 2);

    // The boosted document now outranks its own unboosted past: the same
    // query scores strictly higher than a neutral cosine would give.
    let reranked = engine.retrieve("check disk space").await;
    let first_entry = reranked
        .lines()
        .find(|l| l.starts_with("- ["))
        .unwrap()
        .to_string();
    assert!(first_entry.contains("[history]"));
    assert!(first_entry.contains("df -h"));
}
