//! Token-set Jaccard similarity.
//!
//! Deliberately cheap bag-of-words overlap: lower-case, drop punctuation, split
//! on whitespace, discard short tokens. No stemming, no stop words, no embeddings.

use std::collections::HashSet;

/// Tokens shorter than this are discarded by [`similarity`].
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// Jaccard similarity in `[0, 1]` using the default token length cut-off.
pub fn similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    similarity_with(a, b, DEFAULT_MIN_TOKEN_LEN)
}

/// Jaccard similarity over token sets, keeping tokens of at least `min_token_len` chars.
///
/// Absent or empty input, or two empty token sets, score `0.0`.
pub fn similarity_with(a: Option<&str>, b: Option<&str>, min_token_len: usize) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    jaccard(&token_set(a, min_token_len), &token_set(b, min_token_len))
}

/// Normalized token set: lower-cased, non-word characters removed, short tokens dropped.
pub fn token_set(text: &str, min_token_len: usize) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= min_token_len)
        .map(str::to_owned)
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`, defined as `0.0` when both sets are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}
