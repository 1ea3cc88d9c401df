//! Text extraction and tokenization shared by every analysis stage.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::model::RawSourceRecord;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
        "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
        "would", "could", "should", "may", "might", "can", "this", "that", "these", "those", "a",
        "an", "from",
    ]
    .into_iter()
    .collect()
});

/// Flatten a category's records into non-empty snippets, in record order:
/// article titles, then post title (or content).
pub fn extract_texts(records: &[RawSourceRecord]) -> Vec<String> {
    let mut texts = Vec::new();
    for r in records {
        if let Some(articles) = &r.articles {
            texts.extend(articles.iter().map(|a| a.title.clone()));
        }
        if let Some(posts) = &r.posts {
            texts.extend(posts.iter().map(|p| p.text().to_string()));
        }
    }
    texts.retain(|t| !t.is_empty());
    texts
}

/// Lowercased word tokens; anything that is not alphanumeric or `_` separates.
pub fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word.to_lowercase().as_str())
}

/// Tokens longer than `min_len` chars that are not stop words.
pub fn content_tokens(s: &str, min_len: usize) -> impl Iterator<Item = String> + '_ {
    tokenize(s).filter(move |w| w.chars().count() > min_len && !is_stop_word(w))
}
