//! Word-frequency trending topics with per-category keyword boost.

use std::collections::HashMap;

use super::text::content_tokens;
use crate::category::Category;
use crate::model::TrendingTopic;

/// Tokens must be longer than this many chars to count as a topic.
pub const TOPIC_MIN_LEN: usize = 3;

/// Raw word counts over all texts, before boosting.
pub fn word_frequencies(texts: &[String]) -> HashMap<String, u32> {
    let mut freq: HashMap<String, u32> = HashMap::new();
    for text in texts {
        for w in content_tokens(text, TOPIC_MIN_LEN) {
            *freq.entry(w).or_insert(0) += 1;
        }
    }
    freq
}

/// Double the count of every profile keyword present. Applied once per keyword.
pub fn apply_keyword_boost(freq: &mut HashMap<String, u32>, category: Category) {
    for kw in category.keyword_profile() {
        if let Some(n) = freq.get_mut(&kw.to_lowercase()) {
            *n = n.saturating_mul(2);
        }
    }
}

/// `min(round(frequency / total_texts * 100 * multiplier), 100)`.
pub fn trend_score(frequency: u32, total_texts: usize, multiplier: f64) -> u32 {
    if total_texts == 0 {
        return 0;
    }
    let normalized = f64::from(frequency) / total_texts as f64 * 100.0;
    (normalized * multiplier).round().clamp(0.0, 100.0) as u32
}

/// Top `limit` topics by boosted frequency; ties resolve lexically.
pub fn trending_topics(
    texts: &[String],
    category: Category,
    limit: usize,
    multiplier: f64,
) -> Vec<TrendingTopic> {
    let mut freq = word_frequencies(texts);
    apply_keyword_boost(&mut freq, category);

    let mut entries: Vec<(String, u32)> = freq.into_iter().collect();
    entries.sort_by(|(wa, a), (wb, b)| b.cmp(a).then_with(|| wa.cmp(wb)));

    entries
        .into_iter()
        .take(limit)
        .map(|(topic, frequency)| TrendingTopic {
            score: trend_score(frequency, texts.len(), multiplier),
            topic,
            frequency,
        })
        .collect()
}
