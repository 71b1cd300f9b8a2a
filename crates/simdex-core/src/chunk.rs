//! Fixed-size line chunker.
//!
//! Splits a file's text into consecutive, non-overlapping groups of
//! exactly `chunk_size` lines, the last group taking the remainder.
//! Each [`Chunk`] is tagged with its owning file id and a 1-based
//! inclusive line range, so retrieval results can point back into the
//! original file.
//!
//! Each chunk also receives a SHA-256 hash of its text for content
//! identity across re-indexing.
//!
//! # Guarantees
//!
//! - Chunks partition the line sequence exactly: no overlap, no gaps.
//! - No chunk spans more than `chunk_size` lines; only the last chunk
//!   may span fewer.
//! - `end_line` is clamped to the file's total line count.
//! - Chunking is deterministic: the same text always produces the same
//!   boundaries and hashes.
//! - Empty text yields zero chunks.
//!
//! # Example
//!
//! ```rust
//! use simdex_core::chunk::chunk_lines;
//!
//! let chunks = chunk_lines("file-1", "fn a() {}\nfn b() {}", 50, None);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 2));
//! ```

use sha2::{Digest, Sha256};

use crate::models::Chunk;

/// Split a file's text into fixed-size line windows.
///
/// # Arguments
///
/// * `file_id` — The owning file's identifier (copied into each chunk).
/// * `text` — The full file text.
/// * `chunk_size` — Maximum lines per chunk.
/// * `path` — Logical file path, when project structure is tracked.
pub fn chunk_lines(
    file_id: &str,
    text: &str,
    chunk_size: usize,
    path: Option<&str>,
) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let size = chunk_size.max(1);
    let lines: Vec<&str> = text.lines().collect();
    let total = lines.len();

    let mut chunks = Vec::with_capacity(total.div_ceil(size));
    for (index, group) in lines.chunks(size).enumerate() {
        let start_line = index * size + 1;
        let end_line = (start_line + size - 1).min(total);
        chunks.push(make_chunk(
            file_id,
            index,
            &group.join("\n"),
            start_line,
            end_line,
            path,
        ));
    }

    chunks
}

/// Create a single [`Chunk`] with a SHA-256 content hash.
fn make_chunk(
    file_id: &str,
    index: usize,
    text: &str,
    start_line: usize,
    end_line: usize,
    path: Option<&str>,
) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        file_id: file_id.to_string(),
        chunk_index: index,
        text: text.to_string(),
        start_line,
        end_line,
        path: path.map(|p| p.to_string()),
        hash,
    }
}
