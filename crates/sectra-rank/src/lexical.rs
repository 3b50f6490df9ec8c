//! Lexical comparison primitives shared by ranking and discovery.
//!
//! Both the query-to-section scoring and the section-to-section similarity
//! reduce text to the same normalized term sets, so the two stay consistent
//! and fully deterministic.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;

/// English stopwords excluded from term sets. Kept small on purpose:
/// queries like "data preprocessing" are short, and over-aggressive
/// filtering hurts recall more than it helps precision.
static STOPWORDS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
        "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will", "with",
    ]
    .into_iter()
    .collect()
});

/// Minimum term length. Single characters carry no signal.
const MIN_TERM_LEN: usize = 2;

/// Split text into normalized terms: lowercase, alphanumeric runs only,
/// stopwords and single characters removed. Order follows the input text;
/// duplicates are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TERM_LEN)
        .map(|t| t.to_lowercase())
        .filter(|t| !STOPWORDS.contains(t.as_str()))
        .collect()
}

/// Tokenize into a sorted, deduplicated term set.
pub fn term_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// Count how many terms of `terms` occur in `haystack`.
pub fn overlap_count(terms: &BTreeSet<String>, haystack: &BTreeSet<String>) -> usize {
    terms.iter().filter(|t| haystack.contains(*t)).count()
}

/// Shared terms of two sets, in sorted order.
pub fn shared_terms(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.intersection(b).cloned().collect()
}

/// Symmetric Jaccard similarity of two term sets, in [0, 1].
///
/// Returns 0.0 when either set is empty (no evidence either way).
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let terms = tokenize("Data Preprocessing: Techniques & Methods");
        assert_eq!(terms, vec!["data", "preprocessing", "techniques", "methods"]);
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_short_terms() {
        let terms = tokenize("The analysis of a model is in the data");
        assert_eq!(terms, vec!["analysis", "model", "data"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  !!  ").is_empty());
    }

    #[test]
    fn test_term_set_dedupes() {
        let set = term_set("data data data model");
        assert_eq!(set.len(), 2);
        assert!(set.contains("data"));
        assert!(set.contains("model"));
    }

    #[test]
    fn test_overlap_count() {
        let query = term_set("data preprocessing");
        let section = term_set("preprocessing pipeline for raw data");
        assert_eq!(overlap_count(&query, &section), 2);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = term_set("neural network training");
        let b = term_set("network training optimization");
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        // 2 shared of 4 total distinct terms
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_jaccard_identical_is_one() {
        let a = term_set("data model training");
        assert!((jaccard(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_jaccard_empty_is_zero() {
        let a = term_set("");
        let b = term_set("data");
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&b, &a), 0.0);
    }

    #[test]
    fn test_shared_terms_sorted() {
        let a = term_set("zebra apple data");
        let b = term_set("data zebra mango");
        assert_eq!(shared_terms(&a, &b), vec!["data", "zebra"]);
    }
}
