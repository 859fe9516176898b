//! Similarity Scoring — pluggable, trait-based scorer comparing a job text with a resume text.
//!
//! Default: `TfIdfCosineScorer` (TF-IDF vectors fitted on the pair, cosine of the two).
//! Alternative: `JaccardScorer` (set overlap of content terms).
//!
//! `ScreeningEngine` holds an `Arc<dyn SimilarityScorer>`, chosen at startup via config.
//! Every backend must be symmetric, return 0.0 when either text is empty and
//! 1.0 for identical non-empty texts.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::extraction::normalize;
use crate::screening::tokenizer::tokenize;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The similarity scorer trait. Implement this to swap backends without
/// touching ranking or handler code.
pub trait SimilarityScorer: Send + Sync {
    /// Score in [0.0, 1.0]. Must be symmetric in its arguments.
    fn score(&self, a: &str, b: &str) -> f64;

    /// Short label for logs and responses.
    fn backend(&self) -> SimilarityBackend;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBackend {
    TfIdf,
    Jaccard,
}

impl SimilarityBackend {
    pub fn build(self, max_features: usize) -> Arc<dyn SimilarityScorer> {
        match self {
            SimilarityBackend::TfIdf => Arc::new(TfIdfCosineScorer::new(max_features)),
            SimilarityBackend::Jaccard => Arc::new(JaccardScorer),
        }
    }
}

impl fmt::Display for SimilarityBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityBackend::TfIdf => write!(f, "tfidf"),
            SimilarityBackend::Jaccard => write!(f, "jaccard"),
        }
    }
}

impl FromStr for SimilarityBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(SimilarityBackend::TfIdf),
            "jaccard" => Ok(SimilarityBackend::Jaccard),
            other => Err(format!("unknown similarity backend '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Term extraction
// ────────────────────────────────────────────────────────────────────────────

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "must", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "out", "over", "own", "per", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "us", "very", "via",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "within", "would", "you", "your", "yours",
];

/// Content terms of a text: tokens of 2+ chars that are not stop words.
/// A text made only of stop words falls back to all of its tokens so that it
/// still has a vector.
fn content_terms(normalized: &str) -> Vec<&str> {
    let tokens = tokenize(normalized);
    let filtered: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| t.chars().count() >= 2 && !STOP_WORDS.contains(t))
        .collect();

    if filtered.is_empty() {
        tokens
    } else {
        filtered
    }
}

fn term_counts<'a>(terms: &[&'a str]) -> HashMap<&'a str, u32> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(*term).or_insert(0) += 1;
    }
    counts
}

// ────────────────────────────────────────────────────────────────────────────
// TfIdfCosineScorer — default backend
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity over TF-IDF vectors fitted on the two documents.
///
/// - tf = raw term count
/// - idf = ln((1 + n) / (1 + df)) + 1, with n = 2 documents
/// - vocabulary = the `max_features` terms with the highest combined count
///   (ties broken alphabetically)
///
/// All sums run in lexicographic term order, which makes the score exactly
/// symmetric rather than symmetric up to rounding.
pub struct TfIdfCosineScorer {
    max_features: usize,
}

impl TfIdfCosineScorer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
        }
    }
}

impl SimilarityScorer for TfIdfCosineScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let counts_a = term_counts(&content_terms(&a));
        let counts_b = term_counts(&content_terms(&b));
        if counts_a.is_empty() || counts_b.is_empty() {
            return 0.0;
        }

        let vocabulary = select_vocabulary(&counts_a, &counts_b, self.max_features);

        const DOCS: f64 = 2.0;
        let mut dot = 0.0_f64;
        let mut norm_a = 0.0_f64;
        let mut norm_b = 0.0_f64;

        for term in vocabulary {
            let tf_a = counts_a.get(term).copied().unwrap_or(0) as f64;
            let tf_b = counts_b.get(term).copied().unwrap_or(0) as f64;
            let df = (tf_a > 0.0) as u8 as f64 + (tf_b > 0.0) as u8 as f64;
            let idf = ((1.0 + DOCS) / (1.0 + df)).ln() + 1.0;

            let w_a = tf_a * idf;
            let w_b = tf_b * idf;
            dot += w_a * w_b;
            norm_a += w_a * w_a;
            norm_b += w_b * w_b;
        }

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        (dot / (norm_a * norm_b).sqrt()).clamp(0.0, 1.0)
    }

    fn backend(&self) -> SimilarityBackend {
        SimilarityBackend::TfIdf
    }
}

/// Picks the vocabulary in lexicographic order. Capped at `max_features` by
/// combined frequency.
fn select_vocabulary<'a>(
    counts_a: &HashMap<&'a str, u32>,
    counts_b: &HashMap<&'a str, u32>,
    max_features: usize,
) -> BTreeSet<&'a str> {
    let mut combined: HashMap<&'a str, u32> = HashMap::new();
    for (term, count) in counts_a.iter().chain(counts_b.iter()) {
        *combined.entry(*term).or_insert(0) += count;
    }

    if combined.len() <= max_features {
        return combined.into_keys().collect();
    }

    let mut ranked: Vec<(&'a str, u32)> = combined.into_iter().collect();
    ranked.sort_by(|(ta, ca), (tb, cb)| cb.cmp(ca).then_with(|| ta.cmp(tb)));
    ranked
        .into_iter()
        .take(max_features)
        .map(|(term, _)| term)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// JaccardScorer — set-overlap backend
// ────────────────────────────────────────────────────────────────────────────

/// |terms(A) ∩ terms(B)| / |terms(A) ∪ terms(B)| over content terms.
pub struct JaccardScorer;

impl SimilarityScorer for JaccardScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let set_a: HashSet<&str> = content_terms(&a).into_iter().collect();
        let set_b: HashSet<&str> = content_terms(&b).into_iter().collect();
        let union = set_a.union(&set_b).count();
        if union == 0 {
            return 0.0;
        }
        set_a.intersection(&set_b).count() as f64 / union as f64
    }

    fn backend(&self) -> SimilarityBackend {
        SimilarityBackend::Jaccard
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
