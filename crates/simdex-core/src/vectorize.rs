//! Text vectorization for similarity scoring.
//!
//! Two interchangeable representations, selected by configuration:
//!
//! - **Frequency vector** ([`frequency_vector`]): a bag-of-words term
//!   frequency vector, normalized and padded or truncated to a fixed
//!   dimension. Works with both the remote vector backend and the local
//!   brute-force scan.
//! - **Token set** ([`token_set`]): the set of distinct lower-cased
//!   tokens, compared with the overlap coefficient. Has no fixed
//!   dimension and is computed ad hoc per comparison pair, so it is
//!   local-only.
//!
//! The frequency vector is explicitly NOT a semantic embedding: values
//! are laid out in first-seen token order rather than indexed by a
//! stable vocabulary, so two texts with different vocabularies can
//! produce misaligned dimensions. This is a documented accuracy
//! limitation of the no-external-model path, not a bug to fix in place.

use std::collections::{HashMap, HashSet};

/// Default frequency-vector dimension.
pub const DEFAULT_DIMS: usize = 3072;

/// Which vector representation the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorMethod {
    /// Fixed-dimension normalized term-frequency vectors, scored with
    /// cosine similarity.
    Frequency,
    /// Distinct-token sets, scored with the overlap coefficient.
    TokenSet,
}

/// Split text into lower-cased tokens on runs of non-word characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Map text to a fixed-length normalized term-frequency vector.
///
/// Token frequencies are collected in first-seen order, divided by the
/// total token count, then right-padded with zeros or truncated to
/// exactly `dims` values. Empty or non-word input yields an all-zero
/// vector.
pub fn frequency_vector(text: &str, dims: usize) -> Vec<f32> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<f32> = Vec::new();

    for token in tokenize(text) {
        match seen.get(&token) {
            Some(&slot) => counts[slot] += 1.0,
            None => {
                seen.insert(token, counts.len());
                counts.push(1.0);
            }
        }
    }

    let total: f32 = counts.iter().sum();
    if total > 0.0 {
        for c in &mut counts {
            *c /= total;
        }
    }

    counts.resize(dims, 0.0);
    counts
}

/// Collect the set of distinct lower-cased tokens in a text.
///
/// Degenerate input yields an empty set.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_has_requested_dimension() {
        assert_eq!(frequency_vector("alpha beta", 16).len(), 16);
        assert_eq!(frequency_vector("", 16).len(), 16);
    }

    #[test]
    fn test_empty_text_is_all_zeros() {
        let v = frequency_vector("", 8);
        assert!(v.iter().all(|&x| x == 0.0));
        let v = frequency_vector("  \t\n  ", 8);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_frequencies_are_normalized() {
        // "a a a b" -> a: 3/4, b: 1/4 in first-seen order.
        let v = frequency_vector("a a a b", 4);
        assert!((v[0] - 0.75).abs() < 1e-6);
        assert!((v[1] - 0.25).abs() < 1e-6);
        assert_eq!(v[2], 0.0);
        let sum: f32 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_first_seen_order() {
        // "b" appears first, so it owns dimension 0 despite "a" being
        // more frequent.
        let v = frequency_vector("b a a", 4);
        assert!((v[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((v[1] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_truncates_past_dims() {
        let v = frequency_vector("one two three four five", 3);
        assert_eq!(v.len(), 3);
        // The surviving values are still the per-token frequencies.
        assert!((v[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tokenizer_lowercases_and_splits_on_non_word() {
        let set = token_set("function Add(a, b) { return a+b; }");
        assert!(set.contains("function"));
        assert!(set.contains("add"));
        assert!(set.contains("return"));
        assert!(!set.contains("Add"));
    }

    #[test]
    fn test_underscore_is_a_word_character() {
        let set = token_set("snake_case_name");
        assert!(set.contains("snake_case_name"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_token_set() {
        assert!(token_set("").is_empty());
        assert!(token_set("!!! ???").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "let total = items.map(price).reduce(sum)";
        assert_eq!(frequency_vector(text, 64), frequency_vector(text, 64));
        assert_eq!(token_set(text), token_set(text));
    }
}
