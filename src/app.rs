// src/app.rs
//! Shared service state and the scrape → analyze → push cycle.

use anyhow::Result;
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::analyze::CategoryAnalyzer;
use crate::chain::ChainClient;
use crate::config::{AppConfig, SourceMap};
use crate::model::TrendSnapshot;
use crate::push::PushHub;
use crate::scrape::DataScraper;
use crate::store::TrendStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TrendStore>,
    pub scraper: Arc<DataScraper>,
    pub push: PushHub,
    pub chain: Arc<ChainClient>,
}

impl AppState {
    pub fn new(
        store: Arc<TrendStore>,
        scraper: Arc<DataScraper>,
        push: PushHub,
        chain: Arc<ChainClient>,
    ) -> Self {
        Self {
            store,
            scraper,
            push,
            chain,
        }
    }

    /// Production wiring from settings and the loaded source map.
    pub fn from_config(cfg: &AppConfig, sources: SourceMap) -> Result<Self> {
        let store = TrendStore::new(CategoryAnalyzer::new(cfg.analyzer), cfg.cache_policy);
        let scraper = DataScraper::from_config(cfg, sources)?;
        let chain = ChainClient::new(&cfg.rpc_url, &cfg.fallback_rpc_urls, cfg.request_timeout)?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(scraper),
            PushHub::new(),
            Arc::new(chain),
        ))
    }

    /// One full cycle. `None` scrapes the configured sources.
    pub async fn run_cycle(&self, sources: Option<&SourceMap>) -> Arc<TrendSnapshot> {
        let batch = match sources {
            Some(map) => self.scraper.scrape_sources(Some(map)).await,
            None => self.scraper.run_scheduled_scrape().await,
        };
        let snapshot = self.store.analyze_all(&batch);
        self.push.publish(&snapshot);
        snapshot
    }
}

/// First cycle right away, then one every `interval`. A cycle that overruns
/// delays the next tick instead of bursting.
pub fn spawn_scheduler(state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let snapshot = state.run_cycle(None).await;

            counter!("scrape_runs_total").increment(1);
            gauge!("scrape_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

            tracing::info!(
                target: "scrape",
                categories = snapshot.len(),
                "scheduled scrape completed"
            );
        }
    })
}
