//! Wire and in-memory shapes shared by the scraper, the analyzer and the API.
//!
//! JSON field names follow the dashboard (`topSources`, `lastUpdated`, `scrapedAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::Category;

/// Scrape output keyed by category name. Unknown keys (e.g. "social") are kept
/// but never analyzed.
pub type ScrapeBatch = BTreeMap<String, Vec<RawSourceRecord>>;

/// Latest summary per category, iterated in the fixed category order.
pub type TrendSnapshot = BTreeMap<Category, CategorySummary>;

/// One scrape result for one source URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceRecord {
    #[serde(rename = "source", alias = "sourceUrl", default)]
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<Article>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl RawSourceRecord {
    /// Articles + posts carried by this record.
    pub fn item_count(&self) -> usize {
        self.articles.as_ref().map_or(0, Vec::len) + self.posts.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}

/// News-style item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: String,
}

/// Social-style item. Reddit posts carry a title, tweets carry content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Post {
    /// Title first, then content, then empty.
    pub fn text(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.content.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub frequency: u32,
    /// 0..=100
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u32,
}

/// Per-category output of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub trending: Vec<TrendingTopic>,
    pub sentiment: Sentiment,
    pub volume: u32,
    pub top_sources: Vec<SourceCount>,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CategorySummary {
    /// Empty trending/sources/keywords, neutral, zero volume, no timestamp.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Snapshot with the zero summary for every category.
pub fn default_snapshot() -> TrendSnapshot {
    Category::ALL
        .into_iter()
        .map(|c| (c, CategorySummary::zero()))
        .collect()
}
