//! Result ranking for top-k retrieval.
//!
//! The scoring stage (local scan or remote query) produces unordered
//! [`SimilarMatch`] candidates with raw similarity scores; [`rank`]
//! turns them into the final result list: sorted descending, optionally
//! deduplicated so at most one chunk per source file survives, then
//! truncated to `k`.

use std::collections::HashSet;

use crate::models::SimilarMatch;

/// Rank scored candidates into the final top-k result list.
///
/// Sorting is stable, so ties keep their scan order and repeated calls
/// on an unchanged index return the same ordering. With `dedup_by_file`
/// set, only the highest-scoring chunk of each file is kept (first
/// occurrence wins on ties).
pub fn rank(mut candidates: Vec<SimilarMatch>, k: usize, dedup_by_file: bool) -> Vec<SimilarMatch> {
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if dedup_by_file {
        let mut seen: HashSet<String> = HashSet::new();
        candidates.retain(|m| seen.insert(m.file_id.clone()));
    }

    candidates.truncate(k);
    candidates
}
