//! Similarity scoring functions.
//!
//! Two interchangeable scorers matching the two vector representations
//! in [`crate::vectorize`]:
//!
//! - [`cosine_similarity`] over fixed-length frequency vectors.
//! - [`overlap_coefficient`] over distinct-token sets.
//!
//! Both are symmetric and land in `[0, 1]` for non-negative inputs, and
//! both are total: degenerate input scores 0, never NaN or infinity.

use std::collections::HashSet;

/// Compute cosine similarity between two vectors.
///
/// `dot(a, b) / (‖a‖ × ‖b‖)`, with the denominator floored at 1.0 when
/// either norm is zero — an all-zero vector scores 0 against anything
/// rather than producing NaN. Mismatched dimensions also score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    let denom = if denom == 0.0 { 1.0 } else { denom };

    dot / denom
}

/// Compute the overlap coefficient between two token sets.
///
/// `|A ∩ B| / sqrt(|A| × |B|)`, defined as 0 when either set is empty.
pub fn overlap_coefficient(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    intersection as f32 / ((a.len() * b.len()) as f32).sqrt()
}
