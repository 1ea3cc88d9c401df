// src/analyze/mod.rs
//! Analysis pipeline entry: turns one category's scrape records into a
//! `CategorySummary`.
//!
//! Order:
//! 1) text extraction (titles / post bodies)
//! 2) trending topics (frequency + keyword boost)
//! 3) sentiment (lexicon hit ratio)
//! 4) volume + top sources (per domain)
//! 5) keywords (batch-local TF-IDF)

pub mod keywords;
pub mod sentiment;
pub mod sources;
pub mod text;
pub mod trending;

use chrono::Utc;

use crate::category::Category;
use crate::model::{CategorySummary, RawSourceRecord};

pub use crate::analyze::sentiment::{classify, SentimentCounts, DEFAULT_SENTIMENT_THRESHOLD};
pub use crate::analyze::sources::extract_domain;
pub use crate::analyze::text::extract_texts;

/// Tunables of the pipeline. Defaults reproduce the dashboard's fixed limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerParams {
    pub sentiment_threshold: f64,
    pub trend_score_multiplier: f64,
    pub max_trending: usize,
    pub max_sources: usize,
    pub max_keywords: usize,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            sentiment_threshold: DEFAULT_SENTIMENT_THRESHOLD,
            trend_score_multiplier: 10.0,
            max_trending: 10,
            max_sources: 5,
            max_keywords: 15,
        }
    }
}

/// Stateless per-category analyzer; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct CategoryAnalyzer {
    params: AnalyzerParams,
}

impl CategoryAnalyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AnalyzerParams {
        &self.params
    }

    /// Never fails: no snippets means the zero summary.
    pub fn analyze_category(
        &self,
        category: Category,
        records: &[RawSourceRecord],
    ) -> CategorySummary {
        let texts = extract_texts(records);
        if texts.is_empty() {
            return CategorySummary::zero();
        }

        let p = &self.params;
        CategorySummary {
            trending: trending::trending_topics(
                &texts,
                category,
                p.max_trending,
                p.trend_score_multiplier,
            ),
            sentiment: sentiment::analyze_sentiment(&texts, p.sentiment_threshold),
            volume: sources::calculate_volume(records),
            top_sources: sources::top_sources(records, p.max_sources),
            keywords: keywords::extract_keywords(&texts, p.max_keywords),
            last_updated: Some(Utc::now()),
        }
    }
}
