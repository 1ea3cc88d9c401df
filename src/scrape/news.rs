// src/scrape/news.rs
//! Static news pages: plain HTTP GET + CSS selectors over the document.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::histogram;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};

use super::browser::USER_AGENT;
use super::{host_of, normalize_text, SourceFetcher};
use crate::model::{Article, RawSourceRecord};

pub const MAX_ARTICLES: usize = 10;

/// Generic headline selectors, tried in order.
static HEADLINE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "h1, h2, h3",
        ".headline, .title, .article-title",
        ".news-item, .article, .story",
        ".content, .main-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("static headline selector"))
    .collect()
});

/// Headline-sized text (21..=199 chars) from every selector match, capped at
/// `MAX_ARTICLES`. Matches are not de-duplicated across selectors.
pub fn extract_articles(html: &str, url: &str, category: &str) -> Vec<Article> {
    let doc = Html::parse_document(html);
    let now = Utc::now();
    let source = host_of(url);

    let mut out = Vec::new();
    for sel in HEADLINE_SELECTORS.iter() {
        for el in doc.select(sel) {
            let text = normalize_text(&el.text().collect::<String>());
            let len = text.chars().count();
            if len > 20 && len < 200 {
                out.push(Article {
                    title: text,
                    url: url.to_string(),
                    category: Some(category.to_string()),
                    timestamp: Some(now),
                    source: source.clone(),
                });
            }
        }
    }
    out.truncate(MAX_ARTICLES);
    out
}

/// Catch-all fetcher for every URL not claimed by a more specific one.
#[derive(Clone)]
pub struct NewsFetcher {
    client: reqwest::Client,
}

impl NewsFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("building news http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for NewsFetcher {
    fn name(&self) -> &'static str {
        "news"
    }

    fn handles(&self, _url: &str) -> bool {
        true
    }

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("news http get {url}"))?
            .text()
            .await
            .with_context(|| format!("news http body {url}"))?;

        let articles = extract_articles(&body, url, category);
        histogram!("scrape_fetch_ms", "kind" => "news").record(t0.elapsed().as_secs_f64() * 1_000.0);

        Ok(RawSourceRecord {
            source_url: url.to_string(),
            category: Some(category.to_string()),
            articles: Some(articles),
            posts: None,
            scraped_at: Some(Utc::now()),
        })
    }
}
