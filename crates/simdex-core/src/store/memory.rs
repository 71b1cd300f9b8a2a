//! In-memory fallback store.
//!
//! Holds (chunk, vector) pairs in a `Vec` behind `std::sync::RwLock`.
//! Scans are brute-force over all entries; the engine ranks the scored
//! candidates afterwards. Entries are only ever appended — a file
//! update does not retract previously stored chunks, and the sole
//! removal operation is [`MemoryStore::clear`].

use std::collections::HashSet;
use std::sync::RwLock;

use crate::models::{Chunk, SimilarMatch};
use crate::similarity::{cosine_similarity, overlap_coefficient};
use crate::vectorize::token_set;

struct StoredEntry {
    chunk: Chunk,
    /// Present in frequency-vector configurations; token-set entries
    /// are scored from the chunk text directly.
    vector: Option<Vec<f32>>,
}

/// In-process store used when no remote backend is connected.
pub struct MemoryStore {
    entries: RwLock<Vec<StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append a chunk, with its frequency vector when one was computed.
    pub fn add(&self, chunk: Chunk, vector: Option<Vec<f32>>) {
        let mut entries = self.entries.write().unwrap();
        entries.push(StoredEntry { chunk, vector });
    }

    /// Remove every stored entry.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Score every stored vector against a query vector with cosine
    /// similarity. Entries without vectors score 0.
    pub fn scan_cosine(&self, query: &[f32]) -> Vec<SimilarMatch> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .map(|e| SimilarMatch {
                file_id: e.chunk.file_id.clone(),
                content: e.chunk.text.clone(),
                similarity: e
                    .vector
                    .as_deref()
                    .map(|v| cosine_similarity(query, v))
                    .unwrap_or(0.0),
            })
            .collect()
    }

    /// Score every stored chunk against a query token set with the
    /// overlap coefficient. Chunk token sets are computed per call, not
    /// stored.
    pub fn scan_overlap(&self, query: &HashSet<String>) -> Vec<SimilarMatch> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .map(|e| SimilarMatch {
                file_id: e.chunk.file_id.clone(),
                content: e.chunk.text.clone(),
                similarity: overlap_coefficient(query, &token_set(&e.chunk.text)),
            })
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
