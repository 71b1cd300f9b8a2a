//! The similarity retrieval engine.
//!
//! [`SimilarityEngine`] ties the pipeline together: chunking, vector
//! computation, backend selection, batched remote upserts, top-k
//! queries, and project-structure tracking. It is an explicit service
//! object — construct one at startup and pass it by handle to request
//! handlers; tests construct isolated instances per case.
//!
//! # Backend selection
//!
//! The engine starts `Uninitialized` and resolves to one of two states
//! during construction:
//!
//! - `RemoteConnected` — an API key was present and the vector-service
//!   handshake (list-or-create index) succeeded.
//! - `LocalOnly` — no API key (not an error), the handshake failed, or
//!   the token-set vectorizer is configured (its sets have no fixed
//!   dimension to upsert).
//!
//! Any remote operation failure afterwards degrades the engine to
//! `LocalOnly` for the rest of the session: the failing call falls back
//! to the in-memory store and no recovery is attempted. There are no
//! retries anywhere.

use std::sync::RwLock;

use anyhow::Result;

use simdex_core::chunk::chunk_lines;
use simdex_core::models::{SimilarMatch, SourceFile};
use simdex_core::relations::resolve_imports;
use simdex_core::search::rank;
use simdex_core::store::memory::MemoryStore;
use simdex_core::store::{ChunkRecord, VectorBackend};
use simdex_core::vectorize::{frequency_vector, token_set, VectorMethod};

use crate::config::Config;
use crate::progress::{IndexProgressEvent, IndexProgressReporter, NoProgress};
use crate::remote::RemoteVectorStore;
use crate::structure::{ProjectFile, ProjectStructure};

/// Which storage the engine is currently operating against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    RemoteConnected,
    LocalOnly,
}

/// Code-similarity retrieval engine with remote backend and local
/// in-memory fallback.
pub struct SimilarityEngine {
    chunk_size: usize,
    dims: usize,
    method: VectorMethod,
    dedup_by_file: bool,
    default_top_k: usize,
    batch_size: usize,
    state: RwLock<BackendState>,
    remote: Option<Box<dyn VectorBackend>>,
    local: MemoryStore,
    structure: RwLock<ProjectStructure>,
    reporter: Box<dyn IndexProgressReporter>,
}

impl SimilarityEngine {
    fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            chunk_size: config.chunking.chunk_size,
            dims: config.vector.dims,
            method: config.vector.method()?,
            dedup_by_file: config.retrieval.dedup_by_file,
            default_top_k: config.retrieval.top_k,
            batch_size: config.remote.batch_size.max(1),
            state: RwLock::new(BackendState::Uninitialized),
            remote: None,
            local: MemoryStore::new(),
            structure: RwLock::new(ProjectStructure::new()),
            reporter: Box::new(NoProgress),
        })
    }

    /// Build an engine that never touches the remote service.
    pub fn local(config: &Config) -> Result<Self> {
        let engine = Self::from_config(config)?;
        *engine.state.write().unwrap() = BackendState::LocalOnly;
        Ok(engine)
    }

    /// Build an engine, connecting to the remote vector service when an
    /// API key is configured.
    ///
    /// A missing key selects local-only operation silently; a failed
    /// handshake logs a warning and does the same. Neither is an error.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut engine = Self::from_config(config)?;

        if engine.method == VectorMethod::TokenSet || config.remote.api_key().is_none() {
            *engine.state.write().unwrap() = BackendState::LocalOnly;
            return Ok(engine);
        }

        match RemoteVectorStore::connect(&config.remote, engine.dims).await {
            Ok(store) => {
                engine.remote = Some(Box::new(store));
                *engine.state.write().unwrap() = BackendState::RemoteConnected;
            }
            Err(e) => {
                eprintln!("Warning: vector service unavailable: {}; operating local-only", e);
                *engine.state.write().unwrap() = BackendState::LocalOnly;
            }
        }

        Ok(engine)
    }

    /// Build an engine over a caller-supplied backend. This is the seam
    /// integration tests use to exercise remote and fallback paths
    /// without a network.
    pub fn with_backend(config: &Config, backend: Box<dyn VectorBackend>) -> Result<Self> {
        let mut engine = Self::from_config(config)?;
        engine.remote = Some(backend);
        *engine.state.write().unwrap() = BackendState::RemoteConnected;
        Ok(engine)
    }

    /// Replace the progress reporter (defaults to no-op).
    pub fn with_reporter(mut self, reporter: Box<dyn IndexProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn backend_state(&self) -> BackendState {
        *self.state.read().unwrap()
    }

    /// Result count used when the caller does not pass one.
    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Number of chunks held by the local in-memory store.
    pub fn local_chunks(&self) -> usize {
        self.local.len()
    }

    fn remote_backend(&self) -> Option<&dyn VectorBackend> {
        if self.backend_state() == BackendState::RemoteConnected {
            self.remote.as_deref()
        } else {
            None
        }
    }

    fn degrade(&self, op: &str, err: &anyhow::Error) {
        eprintln!(
            "Warning: vector service {} failed: {}; falling back to the local index",
            op, err
        );
        *self.state.write().unwrap() = BackendState::LocalOnly;
    }

    /// Chunk, vectorize, and store a file's content.
    ///
    /// With a connected remote backend, chunks are upserted in batches;
    /// a failed batch degrades the engine and lands the not-yet-upserted
    /// chunks in the local store instead, so the caller always sees
    /// success. Supplying `file_path` additionally records the file's
    /// import relationships for [`folder_structure`](Self::folder_structure).
    pub async fn add_to_index(&self, file: &SourceFile, file_path: Option<&str>) -> Result<()> {
        let related = match file_path {
            Some(path) => {
                let imports = resolve_imports(&file.content, path);
                let mut structure = self.structure.write().unwrap();
                structure.record_file(&file.id, path);
                structure.record_imports(path, imports.clone());
                if imports.is_empty() {
                    None
                } else {
                    Some(imports)
                }
            }
            None => None,
        };

        let chunks = chunk_lines(&file.id, &file.content, self.chunk_size, file_path);
        if chunks.is_empty() {
            return Ok(());
        }

        self.reporter.report(IndexProgressEvent::Chunked {
            file_id: file.id.clone(),
            chunks: chunks.len() as u64,
        });

        if let Some(backend) = self.remote_backend() {
            let records: Vec<ChunkRecord> = chunks
                .iter()
                .map(|c| {
                    ChunkRecord::from_chunk(c, frequency_vector(&c.text, self.dims), related.clone())
                })
                .collect();

            let batches = records.len().div_ceil(self.batch_size) as u64;
            for (i, batch) in records.chunks(self.batch_size).enumerate() {
                match backend.upsert(batch).await {
                    Ok(()) => {
                        self.reporter.report(IndexProgressEvent::Upserting {
                            file_id: file.id.clone(),
                            batch: i as u64 + 1,
                            batches,
                        });
                    }
                    Err(e) => {
                        self.degrade("upsert", &e);
                        for chunk in &chunks[i * self.batch_size..] {
                            let vector = frequency_vector(&chunk.text, self.dims);
                            self.local.add(chunk.clone(), Some(vector));
                        }
                        return Ok(());
                    }
                }
            }
            return Ok(());
        }

        for chunk in chunks {
            let vector = match self.method {
                VectorMethod::Frequency => Some(frequency_vector(&chunk.text, self.dims)),
                VectorMethod::TokenSet => None,
            };
            self.local.add(chunk, vector);
        }

        Ok(())
    }

    /// Return the `k` stored chunks most similar to a free-text query,
    /// best first.
    ///
    /// Queries the remote backend when connected (using its native
    /// score); otherwise scans the local store with the configured
    /// scoring function. Degenerate queries and an empty index yield an
    /// empty list rather than an error.
    pub async fn find_similar(&self, query: &str, k: usize) -> Result<Vec<SimilarMatch>> {
        match self.method {
            VectorMethod::Frequency => {
                let query_vec = frequency_vector(query, self.dims);

                if let Some(backend) = self.remote_backend() {
                    match backend.query(&query_vec, k).await {
                        Ok(matches) => {
                            let hits = matches
                                .into_iter()
                                .map(|m| SimilarMatch {
                                    file_id: m.metadata.file_id,
                                    content: m.metadata.content,
                                    similarity: m.score,
                                })
                                .collect();
                            return Ok(rank(hits, k, self.dedup_by_file));
                        }
                        Err(e) => self.degrade("query", &e),
                    }
                }

                Ok(rank(self.local.scan_cosine(&query_vec), k, self.dedup_by_file))
            }
            VectorMethod::TokenSet => {
                let query_tokens = token_set(query);
                Ok(rank(
                    self.local.scan_overlap(&query_tokens),
                    k,
                    self.dedup_by_file,
                ))
            }
        }
    }

    /// Empty the local store and, when connected, the remote index.
    ///
    /// This is the only removal operation: per-file and per-chunk
    /// deletion are not supported.
    pub async fn clear(&self) -> Result<()> {
        self.local.clear();

        if let Some(backend) = self.remote_backend() {
            if let Err(e) = backend.delete_all().await {
                self.degrade("delete-all", &e);
            }
        }

        Ok(())
    }

    /// Seed the project folder tree with a file listing.
    pub fn initialize_project_structure(&self, files: &[ProjectFile]) {
        self.structure.write().unwrap().initialize(files);
    }

    /// Record a file's path and import relationships without indexing
    /// its content (structure-only scans).
    pub fn record_relationships(&self, file_id: &str, path: &str, imports: Vec<String>) {
        let mut structure = self.structure.write().unwrap();
        structure.record_file(file_id, path);
        structure.record_imports(path, imports);
    }

    /// Render the folder tree of known files, with import relationships,
    /// restricted to the given indexed file ids plus the seeded listing.
    pub fn folder_structure(&self, file_ids: &[String]) -> String {
        self.structure.read().unwrap().render(file_ids)
    }
}
