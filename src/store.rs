//! # Trend Store
//! In-memory cache of the latest `CategorySummary` per category.
//!
//! The snapshot is an `Arc<TrendSnapshot>` behind a lock that is held only to
//! swap the pointer, so readers observe either the previous or the new
//! complete snapshot. Nothing is persisted.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use metrics::{counter, gauge};
use thiserror::Error;

use crate::analyze::CategoryAnalyzer;
use crate::category::Category;
use crate::model::{default_snapshot, CategorySummary, ScrapeBatch, TrendSnapshot};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrendError {
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}

/// How a new analysis pass is folded into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Recompute all six categories; a category without records blanks to zero.
    #[default]
    Replace,
    /// Only categories present as keys in the batch are updated.
    Merge,
}

impl FromStr for CachePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(CachePolicy::Replace),
            "merge" => Ok(CachePolicy::Merge),
            other => anyhow::bail!("unknown cache policy: {other}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct TrendStore {
    analyzer: CategoryAnalyzer,
    policy: CachePolicy,
    snapshot: RwLock<Option<Arc<TrendSnapshot>>>,
}

impl TrendStore {
    pub fn new(analyzer: CategoryAnalyzer, policy: CachePolicy) -> Self {
        Self {
            analyzer,
            policy,
            snapshot: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Analyze every fixed category (in order), publish, and return the result.
    pub fn analyze_all(&self, batch: &ScrapeBatch) -> Arc<TrendSnapshot> {
        // Analysis runs outside the lock.
        let fresh: TrendSnapshot = Category::ALL
            .into_iter()
            .filter(|c| self.policy == CachePolicy::Replace || batch.contains_key(c.as_str()))
            .map(|c| {
                let records = batch.get(c.as_str()).map(Vec::as_slice).unwrap_or_default();
                (c, self.analyzer.analyze_category(c, records))
            })
            .collect();

        let published = {
            let mut guard = self
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let next = match (self.policy, guard.as_deref()) {
                (CachePolicy::Merge, Some(prev)) => {
                    let mut merged = prev.clone();
                    merged.extend(fresh);
                    merged
                }
                _ => fresh,
            };
            let next = Arc::new(next);
            *guard = Some(next.clone());
            next
        };

        counter!("analysis_runs_total").increment(1);
        gauge!("trends_last_update_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(
            target: "analysis",
            categories = published.len(),
            policy = ?self.policy,
            "trend snapshot published"
        );

        published
    }

    /// Cached snapshot, or the zero summary for every category.
    pub fn get_all(&self) -> Arc<TrendSnapshot> {
        self.cached()
            .unwrap_or_else(|| Arc::new(default_snapshot()))
    }

    /// `Err` for unknown names; `Ok(None)` when nothing is cached for it yet.
    pub fn get_one(&self, category: &str) -> Result<Option<CategorySummary>, TrendError> {
        let c: Category = category.parse()?;
        Ok(self.cached().and_then(|s| s.get(&c).cloned()))
    }

    fn cached(&self) -> Option<Arc<TrendSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, RawSourceRecord};

    fn batch(cat: &str, titles: &[&str]) -> ScrapeBatch {
        let rec = RawSourceRecord {
            source_url: "https://www.inquirer.net".into(),
            articles: Some(
                titles
                    .iter()
                    .map(|t| Article {
                        title: t.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        };
        ScrapeBatch::from([(cat.to_string(), vec![rec])])
    }

    #[test]
    fn invalid_category_is_an_error() {
        let store = TrendStore::default();
        assert_eq!(
            store.get_one("weather"),
            Err(TrendError::InvalidCategory("weather".into()))
        );
    }

    #[test]
    fn valid_category_without_data_is_none() {
        let store = TrendStore::default();
        assert_eq!(store.get_one("crypto"), Ok(None));
    }

    #[test]
    fn defaults_before_first_pass() {
        let store = TrendStore::default();
        let all = store.get_all();
        assert_eq!(all.len(), 6);
        assert!(all.values().all(CategorySummary::is_zero));
    }

    #[test]
    fn merge_policy_parses() {
        assert_eq!("Merge".parse::<CachePolicy>().unwrap(), CachePolicy::Merge);
        assert_eq!(" replace ".parse::<CachePolicy>().unwrap(), CachePolicy::Replace);
        assert!("append".parse::<CachePolicy>().is_err());
    }

    #[test]
    fn readers_keep_old_snapshot_handle() {
        let store = TrendStore::default();
        let first = store.analyze_all(&batch("news", &["Breaking update from Manila"]));
        let held = store.get_all();
        store.analyze_all(&batch("news", &[]));
        // the handle taken before the second pass is unchanged
        assert!(Arc::ptr_eq(&first, &held));
        assert!(!held[&Category::News].is_zero());
        assert!(store.get_all()[&Category::News].is_zero());
    }
}
