//! Batch-local TF-IDF keywords.
//!
//! Every call builds its own model: each snippet is a document, the corpus is
//! all surviving tokens of the batch. Nothing carries over between passes, so
//! the same batch always yields the same keywords.

use std::collections::{HashMap, HashSet};

use super::text::content_tokens;

/// Keyword tokens must be longer than this (stricter than trending topics).
pub const KEYWORD_MIN_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct TermScore {
    pub term: String,
    pub tfidf: f64,
}

/// Score every term: corpus frequency x (1 + ln(N / (1 + df))).
pub fn score_terms(texts: &[String]) -> Vec<TermScore> {
    let docs: Vec<Vec<String>> = texts
        .iter()
        .map(|t| content_tokens(t, KEYWORD_MIN_LEN).collect())
        .collect();

    let mut tf: HashMap<&str, u32> = HashMap::new();
    let mut df: HashMap<&str, u32> = HashMap::new();
    for doc in &docs {
        let mut seen: HashSet<&str> = HashSet::new();
        for w in doc {
            *tf.entry(w.as_str()).or_insert(0) += 1;
            if seen.insert(w.as_str()) {
                *df.entry(w.as_str()).or_insert(0) += 1;
            }
        }
    }

    let n = docs.len() as f64;
    let mut scored: Vec<TermScore> = tf
        .into_iter()
        .map(|(term, f)| {
            let d = f64::from(df.get(term).copied().unwrap_or(0));
            let idf = 1.0 + (n / (1.0 + d)).ln();
            TermScore {
                term: term.to_string(),
                tfidf: f64::from(f) * idf,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.tfidf
            .total_cmp(&a.tfidf)
            .then_with(|| a.term.cmp(&b.term))
    });
    scored
}

/// Top `limit` terms by importance.
pub fn extract_keywords(texts: &[String], limit: usize) -> Vec<String> {
    score_terms(texts)
        .into_iter()
        .map(|s| s.term)
        .filter(|t| t.chars().count() > 3)
        .take(limit)
        .collect()
}
