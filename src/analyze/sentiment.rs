//! Lexicon hit-ratio sentiment.
//!
//! The threshold is a share of *all* tokens, not of lexicon hits: a long text
//! with a single positive word stays neutral.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::text::tokenize;
use crate::model::Sentiment;

pub const DEFAULT_SENTIMENT_THRESHOLD: f64 = 0.01;

static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good",
        "great",
        "excellent",
        "amazing",
        "wonderful",
        "positive",
        "success",
        "win",
        "victory",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "negative", "failure", "loss", "defeat", "disaster",
    ]
    .into_iter()
    .collect()
});

/// Lexicon hits over the unfiltered token stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub total: usize,
}

impl SentimentCounts {
    pub fn from_texts(texts: &[String]) -> Self {
        let mut c = Self::default();
        for text in texts {
            for w in tokenize(text) {
                c.total += 1;
                if POSITIVE.contains(w.as_str()) {
                    c.positive += 1;
                }
                if NEGATIVE.contains(w.as_str()) {
                    c.negative += 1;
                }
            }
        }
        c
    }
}

pub fn classify(counts: SentimentCounts, threshold: f64) -> Sentiment {
    if counts.total == 0 {
        return Sentiment::Neutral;
    }
    let total = counts.total as f64;
    let pos = counts.positive as f64 / total;
    let neg = counts.negative as f64 / total;

    if pos > neg && pos > threshold {
        Sentiment::Positive
    } else if neg > pos && neg > threshold {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

pub fn analyze_sentiment(texts: &[String], threshold: f64) -> Sentiment {
    classify(SentimentCounts::from_texts(texts), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(positive: usize, negative: usize, total: usize) -> SentimentCounts {
        SentimentCounts {
            positive,
            negative,
            total,
        }
    }

    #[test]
    fn zero_tokens_is_neutral() {
        assert_eq!(classify(counts(0, 0, 0), 0.01), Sentiment::Neutral);
        assert_eq!(analyze_sentiment(&[], 0.01), Sentiment::Neutral);
        assert_eq!(analyze_sentiment(&["?!".to_string()], 0.01), Sentiment::Neutral);
    }

    #[test]
    fn three_percent_positive() {
        assert_eq!(classify(counts(3, 0, 100), 0.01), Sentiment::Positive);
    }

    #[test]
    fn below_threshold_stays_neutral() {
        assert_eq!(classify(counts(1, 0, 1000), 0.01), Sentiment::Neutral);
    }

    #[test]
    fn negative_wins_when_dominant() {
        assert_eq!(classify(counts(1, 4, 100), 0.01), Sentiment::Negative);
    }

    #[test]
    fn balanced_is_neutral() {
        assert_eq!(classify(counts(5, 5, 100), 0.01), Sentiment::Neutral);
    }

    #[test]
    fn counts_whole_tokens_only() {
        let c = SentimentCounts::from_texts(&[
            "Great win for Gilas, no disaster".to_string(),
            "goodness".to_string(),
        ]);
        assert_eq!(c, counts(2, 1, 7));
    }
}
