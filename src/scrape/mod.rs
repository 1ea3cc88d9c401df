// src/scrape/mod.rs
//! Scrape orchestration: source map → `ScrapeBatch`.
//!
//! Each URL is routed to the first fetcher whose `handles` matches. Sources of
//! one category are fetched concurrently (order kept), categories one after
//! another. A failing source is logged, counted and skipped; it never aborts
//! the batch.

pub mod browser;
pub mod news;
pub mod reddit_api;
pub mod social;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, SourceMap};
use crate::model::{RawSourceRecord, ScrapeBatch};
use browser::PageRenderer;

/// One kind of source (static news page, rendered social page, API).
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Short label for logs and metrics.
    fn name(&self) -> &'static str;

    /// Whether this fetcher should take `url`.
    fn handles(&self, url: &str) -> bool;

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord>;
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scrape_sources_total", "Sources scraped successfully.");
        describe_counter!(
            "scrape_source_errors_total",
            "Sources that failed or timed out and were skipped."
        );
        describe_histogram!("scrape_cycle_ms", "Full scrape of a source map in milliseconds.");
        describe_histogram!("scrape_fetch_ms", "Single source fetch time in milliseconds.");
    });
}

/// Decode entities, strip tags, ASCII quotes, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();

    let out = html_escape::decode_html_entities(s);
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let out = re_tags.replace_all(&out, "");

    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Full hostname of `url` (keeps `www.`); the raw string if it does not parse.
pub fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

pub struct DataScraper {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    sources: SourceMap,
    max_concurrent: usize,
    renderer: Arc<dyn PageRenderer>,
}

impl DataScraper {
    /// Production wiring: Reddit API (when credentials are set), rendered
    /// social pages, then plain HTTP news as the catch-all.
    pub fn from_config(cfg: &AppConfig, sources: SourceMap) -> Result<Self> {
        let renderer = browser::default_renderer();
        let mut fetchers: Vec<Arc<dyn SourceFetcher>> = Vec::new();
        if let Some(creds) = cfg.reddit.clone() {
            fetchers.push(Arc::new(reddit_api::RedditApiFetcher::new(
                creds,
                cfg.request_timeout,
            )?));
            tracing::info!(target: "scrape", "reddit sources use the OAuth API");
        }
        fetchers.push(Arc::new(social::SocialFetcher::new(
            renderer.clone(),
            cfg.browser_timeout,
        )));
        fetchers.push(Arc::new(news::NewsFetcher::new(cfg.request_timeout)?));

        Ok(Self::with_fetchers(fetchers, sources, cfg.max_concurrent_scrapes).with_renderer(renderer))
    }

    /// Custom routing table; tried in order.
    pub fn with_fetchers(
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        sources: SourceMap,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetchers,
            sources,
            max_concurrent: max_concurrent.max(1),
            renderer: Arc::new(browser::DisabledRenderer),
        }
    }

    /// Renderer released by `close()`.
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Configured source map (used when a request brings none).
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Scrape one URL with the first matching fetcher.
    pub async fn scrape_url(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        let fetcher = self
            .fetchers
            .iter()
            .find(|f| f.handles(url))
            .ok_or_else(|| anyhow!("no fetcher for {url}"))?;
        tracing::debug!(target: "scrape", fetcher = fetcher.name(), url, category, "fetching");
        fetcher.fetch(url, category).await
    }

    /// Scrape every category of `sources` (or the configured map). Keys of the
    /// result are the category keys of the map; failed sources are missing
    /// from their list.
    pub async fn scrape_sources(&self, sources: Option<&SourceMap>) -> ScrapeBatch {
        ensure_metrics_described();
        let sources = sources.unwrap_or(&self.sources);
        let t0 = Instant::now();

        let mut batch = ScrapeBatch::new();
        for (category, urls) in sources {
            // owned items keep the buffered future Send for tokio::spawn
            let results: Vec<(String, Result<RawSourceRecord>)> = stream::iter(urls.clone())
                .map(|url| {
                    let category = category.clone();
                    async move {
                        let res = self.scrape_url(&url, &category).await;
                        (url, res)
                    }
                })
                .buffered(self.max_concurrent)
                .boxed()
                .collect()
                .await;

            let mut records = Vec::with_capacity(results.len());
            for (url, res) in results {
                match res {
                    Ok(rec) => {
                        counter!("scrape_sources_total").increment(1);
                        tracing::debug!(
                            target: "scrape",
                            category = %category,
                            url = %url,
                            items = rec.item_count(),
                            "source scraped"
                        );
                        records.push(rec);
                    }
                    Err(e) => {
                        counter!("scrape_source_errors_total").increment(1);
                        tracing::warn!(
                            target: "scrape",
                            category = %category,
                            url = %url,
                            error = ?e,
                            "source failed, skipped"
                        );
                    }
                }
            }
            tracing::info!(
                target: "scrape",
                category = %category,
                ok = records.len(),
                total = urls.len(),
                "category scraped"
            );
            batch.insert(category.clone(), records);
        }

        histogram!("scrape_cycle_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        batch
    }

    /// Scheduled run over the configured source map.
    pub async fn run_scheduled_scrape(&self) -> ScrapeBatch {
        tracing::info!(target: "scrape", "starting scheduled scrape");
        self.scrape_sources(None).await
    }

    /// Release the headless browser, if one was launched.
    pub async fn close(&self) -> Result<()> {
        self.renderer.close().await
    }
}
