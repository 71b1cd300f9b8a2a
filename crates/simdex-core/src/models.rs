//! Core data models used throughout Simdex.
//!
//! These types represent the source files, chunks, and search results
//! that flow through the indexing and retrieval pipeline.

/// A source file submitted for indexing.
///
/// The `id` is externally assigned and stable across updates of the
/// same file; Simdex never generates or rewrites it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: String,
    pub content: String,
}

/// A fixed-size, line-aligned slice of a file's text — the unit of
/// indexing.
///
/// `start_line` and `end_line` are 1-based and inclusive. Chunks of one
/// file, concatenated in order, reconstruct the file's line sequence
/// exactly: no overlap, no gaps, and only the last chunk may span fewer
/// than `chunk_size` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Identifier of the owning file.
    pub file_id: String,
    /// Position of this chunk within the file's chunk sequence (0-based).
    pub chunk_index: usize,
    /// Literal content: the chunk's line range joined with `\n`.
    pub text: String,
    /// First line of the chunk within the source file (1-based).
    pub start_line: usize,
    /// Last line of the chunk within the source file (1-based, inclusive).
    pub end_line: usize,
    /// Logical path of the owning file, when the caller tracks project
    /// structure.
    pub path: Option<String>,
    /// SHA-256 of the chunk text, used to detect content changes across
    /// re-indexing.
    pub hash: String,
}

impl Chunk {
    /// Stable identifier for this chunk in a vector backend:
    /// `{file_id}-{chunk_index}`.
    pub fn record_id(&self) -> String {
        format!("{}-{}", self.file_id, self.chunk_index)
    }
}

/// A ranked search result returned from the retrieval engine.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimilarMatch {
    /// Identifier of the file the matching chunk came from.
    pub file_id: String,
    /// The matching chunk's text.
    pub content: String,
    /// Similarity score; cosine or overlap coefficient depending on the
    /// configured vectorizer.
    pub similarity: f32,
}
