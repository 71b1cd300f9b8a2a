//! Storage abstraction for Simdex.
//!
//! The [`VectorBackend`] trait defines the operations the retrieval
//! engine needs from a remote vector-store service; the concrete HTTP
//! client lives in the `simdex` app crate. The [`memory`] module holds
//! the in-process fallback store.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Chunk;

/// Metadata persisted alongside each vector in a backend.
///
/// Carries enough to map a query match back to a
/// [`SimilarMatch`](crate::models::SimilarMatch) without a second
/// round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning file's identifier.
    pub file_id: String,
    /// The chunk's literal text.
    pub content: String,
    /// First line of the chunk (1-based).
    pub start_line: usize,
    /// Last line of the chunk (1-based, inclusive).
    pub end_line: usize,
    /// Logical file path, when project structure is tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Resolved import targets of the owning file, when tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Vec<String>>,
}

/// A (vector, metadata) pair ready for upsert into a backend.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkRecord {
    /// Backend identifier: `{file_id}-{chunk_index}`.
    pub id: String,
    /// The chunk's frequency vector.
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    /// Build a record from a chunk and its vector, attaching the file's
    /// resolved imports when known.
    pub fn from_chunk(chunk: &Chunk, values: Vec<f32>, related: Option<Vec<String>>) -> Self {
        Self {
            id: chunk.record_id(),
            values,
            metadata: ChunkMetadata {
                file_id: chunk.file_id.clone(),
                content: chunk.text.clone(),
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                path: chunk.path.clone(),
                related,
            },
        }
    }
}

/// A scored match returned from a backend query.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    /// The backend's native similarity score.
    pub score: f32,
    pub metadata: ChunkMetadata,
}

/// Remote vector-store backend used by the retrieval engine.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert`](VectorBackend::upsert) | Store a batch of chunk records |
/// | [`query`](VectorBackend::query) | Top-k similarity query |
/// | [`delete_all`](VectorBackend::delete_all) | Drop every stored record |
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Store a batch of records.
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()>;

    /// Return the `top_k` records most similar to `vector`, scored by
    /// the backend, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>>;

    /// Remove every record from the backend's index.
    async fn delete_all(&self) -> Result<()>;
}
