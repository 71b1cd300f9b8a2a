//! Engine-level integration tests.
//!
//! Exercises the remote-backend and fallback paths through a scripted
//! in-memory backend, without any network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use simdex::config::Config;
use simdex::engine::{BackendState, SimilarityEngine};
use simdex_core::models::SourceFile;
use simdex_core::similarity::cosine_similarity;
use simdex_core::store::{ChunkRecord, ScoredRecord, VectorBackend};

/// Scriptable in-memory stand-in for the remote vector service.
#[derive(Clone, Default)]
struct FakeBackend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    records: Mutex<Vec<ChunkRecord>>,
    fail_upsert: bool,
    fail_query: bool,
    delete_calls: AtomicUsize,
}

impl FakeBackend {
    fn new() -> Self {
        Self::default()
    }

    fn failing() -> Self {
        Self {
            inner: Arc::new(Inner {
                fail_upsert: true,
                fail_query: true,
                ..Default::default()
            }),
        }
    }

    fn failing_queries_only() -> Self {
        Self {
            inner: Arc::new(Inner {
                fail_query: true,
                ..Default::default()
            }),
        }
    }

    fn stored(&self) -> usize {
        self.inner.records.lock().unwrap().len()
    }

    fn delete_calls(&self) -> usize {
        self.inner.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorBackend for FakeBackend {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()> {
        if self.inner.fail_upsert {
            bail!("simulated upsert failure");
        }
        self.inner.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        if self.inner.fail_query {
            bail!("simulated query failure");
        }
        let records = self.inner.records.lock().unwrap();
        let mut matches: Vec<ScoredRecord> = records
            .iter()
            .map(|r| ScoredRecord {
                id: r.id.clone(),
                score: cosine_similarity(vector, &r.values),
                metadata: r.metadata.clone(),
            })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        self.inner.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.records.lock().unwrap().clear();
        Ok(())
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.vector.dims = 128;
    config.remote.batch_size = 2;
    config
}

fn file(id: &str, content: &str) -> SourceFile {
    SourceFile {
        id: id.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn remote_roundtrip_uses_backend_scores() {
    let backend = FakeBackend::new();
    let engine =
        SimilarityEngine::with_backend(&config(), Box::new(backend.clone())).unwrap();

    engine
        .add_to_index(
            &file("math", "function add(a,b){return a+b}\nfunction sub(a,b){return a-b}"),
            None,
        )
        .await
        .unwrap();
    engine
        .add_to_index(&file("greet", "console.log('hello world')"), None)
        .await
        .unwrap();

    // Chunks landed remotely, not in the local fallback store.
    assert_eq!(backend.stored(), 2);
    assert_eq!(engine.local_chunks(), 0);
    assert_eq!(engine.backend_state(), BackendState::RemoteConnected);

    // Querying with the indexed text itself scores an exact match.
    let results = engine
        .find_similar("function add(a,b){return a+b}\nfunction sub(a,b){return a-b}", 5)
        .await
        .unwrap();
    assert_eq!(results[0].file_id, "math");
    assert!(results[0].similarity > 0.9);
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn upsert_batches_respect_batch_size() {
    let backend = FakeBackend::new();
    let mut cfg = config();
    cfg.chunking.chunk_size = 1;
    cfg.remote.batch_size = 2;
    let engine = SimilarityEngine::with_backend(&cfg, Box::new(backend.clone())).unwrap();

    // 5 single-line chunks -> 3 batches of 2, 2, 1.
    let content = (1..=5).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
    engine.add_to_index(&file("f1", &content), None).await.unwrap();

    assert_eq!(backend.stored(), 5);
    let records = backend.inner.records.lock().unwrap();
    assert_eq!(records[0].id, "f1-0");
    assert_eq!(records[4].id, "f1-4");
}

#[tokio::test]
async fn failed_upsert_falls_back_to_local_store() {
    let backend = FakeBackend::failing();
    let engine =
        SimilarityEngine::with_backend(&config(), Box::new(backend.clone())).unwrap();

    let f = file(
        "file-1",
        "function add(a,b){return a+b}\nfunction sub(a,b){return a-b}",
    );
    // The caller still sees success.
    engine.add_to_index(&f, None).await.unwrap();

    assert_eq!(backend.stored(), 0);
    assert_eq!(engine.local_chunks(), 1);
    assert_eq!(engine.backend_state(), BackendState::LocalOnly);

    // The previously indexed chunk is still the top hit, served from
    // the local index.
    let results = engine.find_similar("addition function", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].file_id, "file-1");
    assert!(results[0].similarity > 0.0);
}

#[tokio::test]
async fn failed_query_degrades_for_the_session() {
    let backend = FakeBackend::failing_queries_only();
    let engine =
        SimilarityEngine::with_backend(&config(), Box::new(backend.clone())).unwrap();

    engine
        .add_to_index(&file("f1", "some remote content"), None)
        .await
        .unwrap();
    assert_eq!(backend.stored(), 1);

    // Query failure is absorbed; the local store has nothing yet.
    let results = engine.find_similar("remote content", 5).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(engine.backend_state(), BackendState::LocalOnly);

    // Degradation is one-way: later adds go to the local store even
    // though the backend would accept them.
    engine
        .add_to_index(&file("f2", "later local content"), None)
        .await
        .unwrap();
    assert_eq!(backend.stored(), 1);
    assert_eq!(engine.local_chunks(), 1);
}

#[tokio::test]
async fn clear_issues_delete_all_and_empties_local() {
    let backend = FakeBackend::new();
    let engine =
        SimilarityEngine::with_backend(&config(), Box::new(backend.clone())).unwrap();

    engine
        .add_to_index(&file("f1", "indexed remotely"), None)
        .await
        .unwrap();
    engine.clear().await.unwrap();

    assert_eq!(backend.delete_calls(), 1);
    assert_eq!(backend.stored(), 0);

    let results = engine.find_similar("anything", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn dedup_keeps_one_chunk_per_file() {
    let mut cfg = config();
    cfg.chunking.chunk_size = 1;
    let engine = SimilarityEngine::local(&cfg).unwrap();

    let repeated = "needle alpha\nneedle beta\nneedle gamma";
    engine.add_to_index(&file("hay", repeated), None).await.unwrap();
    engine
        .add_to_index(&file("other", "nothing relevant here"), None)
        .await
        .unwrap();

    let results = engine.find_similar("needle", 10).await.unwrap();
    let hay_hits = results.iter().filter(|m| m.file_id == "hay").count();
    assert_eq!(hay_hits, 1);
}

#[tokio::test]
async fn no_dedup_returns_multiple_chunks_per_file() {
    let mut cfg = config();
    cfg.chunking.chunk_size = 1;
    cfg.retrieval.dedup_by_file = false;
    let engine = SimilarityEngine::local(&cfg).unwrap();

    let repeated = "needle alpha\nneedle beta\nneedle gamma";
    engine.add_to_index(&file("hay", repeated), None).await.unwrap();

    let results = engine.find_similar("needle", 10).await.unwrap();
    let hay_hits = results.iter().filter(|m| m.file_id == "hay").count();
    assert!(hay_hits > 1);
}

#[tokio::test]
async fn repeated_queries_return_stable_order() {
    let engine = SimilarityEngine::local(&config()).unwrap();
    for (id, content) in [
        ("a", "shared words here"),
        ("b", "shared words here"),
        ("c", "shared words here"),
    ] {
        engine.add_to_index(&file(id, content), None).await.unwrap();
    }

    let first = engine.find_similar("shared words", 3).await.unwrap();
    let second = engine.find_similar("shared words", 3).await.unwrap();
    let order_a: Vec<&str> = first.iter().map(|m| m.file_id.as_str()).collect();
    let order_b: Vec<&str> = second.iter().map(|m| m.file_id.as_str()).collect();
    assert_eq!(order_a, order_b);
}

#[tokio::test]
async fn overlap_scenario_one_common_word_of_ten() {
    let mut cfg = config();
    cfg.vector.method = "token-set".to_string();
    cfg.retrieval.dedup_by_file = false;
    let engine = SimilarityEngine::local(&cfg).unwrap();

    // 10 distinct tokens each, exactly one shared.
    engine
        .add_to_index(&file("left", "shared l1 l2 l3 l4 l5 l6 l7 l8 l9"), None)
        .await
        .unwrap();

    let query = "shared r1 r2 r3 r4 r5 r6 r7 r8 r9";
    let results = engine.find_similar(query, 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!((results[0].similarity - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn remote_records_carry_metadata() {
    let backend = FakeBackend::new();
    let engine =
        SimilarityEngine::with_backend(&config(), Box::new(backend.clone())).unwrap();

    engine
        .add_to_index(
            &file("app", "import { util } from './util'\nexport const x = util()"),
            Some("src/app.ts"),
        )
        .await
        .unwrap();

    let records = backend.inner.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    let meta = &records[0].metadata;
    assert_eq!(meta.file_id, "app");
    assert_eq!(meta.start_line, 1);
    assert_eq!(meta.end_line, 2);
    assert_eq!(meta.path.as_deref(), Some("src/app.ts"));
    assert_eq!(meta.related.as_deref(), Some(&["src/util".to_string()][..]));
}
