// src/scrape/social.rs
//! JavaScript-rendered social pages (X/Twitter, Reddit, Facebook) through the
//! shared headless browser.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use metrics::histogram;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::browser::PageRenderer;
use super::{normalize_text, SourceFetcher};
use crate::model::{Post, RawSourceRecord};

pub const MAX_POSTS: usize = 15;

static REDDIT_POST: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-testid="post-container"]"#).expect("reddit selector"));
static REDDIT_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").expect("h3 selector"));
static TWEET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-testid="tweet"]"#).expect("tweet selector"));
static TWEET_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-testid="tweetText"]"#).expect("tweet text selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
    Reddit,
    Facebook,
}

impl Platform {
    pub fn detect(url: &str) -> Option<Self> {
        if url.contains("twitter.com") {
            Some(Platform::Twitter)
        } else if url.contains("reddit.com") {
            Some(Platform::Reddit)
        } else if url.contains("facebook.com") {
            Some(Platform::Facebook)
        } else {
            None
        }
    }
}

/// Titles of the first 15 post containers; titles of 10 chars or less are dropped.
pub fn extract_reddit_posts(html: &str) -> Vec<Post> {
    let doc = Html::parse_document(html);
    let now = Utc::now();
    doc.select(&REDDIT_POST)
        .take(MAX_POSTS)
        .filter_map(|post| {
            let title = post
                .select(&REDDIT_TITLE)
                .next()
                .map(|h| normalize_text(&h.text().collect::<String>()))
                .unwrap_or_default();
            (title.chars().count() > 10).then(|| Post {
                title: Some(title),
                content: None,
                platform: "reddit".into(),
                timestamp: Some(now),
            })
        })
        .collect()
}

/// Text of the first 15 tweets; texts of 20 chars or less are dropped.
pub fn extract_tweets(html: &str) -> Vec<Post> {
    let doc = Html::parse_document(html);
    let now = Utc::now();
    doc.select(&TWEET)
        .take(MAX_POSTS)
        .filter_map(|tweet| {
            let text = tweet
                .select(&TWEET_TEXT)
                .next()
                .map(|t| normalize_text(&t.text().collect::<String>()))
                .unwrap_or_default();
            (text.chars().count() > 20).then(|| Post {
                title: None,
                content: Some(text),
                platform: "twitter".into(),
                timestamp: Some(now),
            })
        })
        .collect()
}

pub struct SocialFetcher {
    renderer: Arc<dyn PageRenderer>,
    timeout: Duration,
}

impl SocialFetcher {
    pub fn new(renderer: Arc<dyn PageRenderer>, timeout: Duration) -> Self {
        Self { renderer, timeout }
    }
}

#[async_trait]
impl SourceFetcher for SocialFetcher {
    fn name(&self) -> &'static str {
        "social"
    }

    fn handles(&self, url: &str) -> bool {
        Platform::detect(url).is_some()
    }

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        let t0 = Instant::now();
        let html = self.renderer.render(url, self.timeout).await?;

        let mut posts = match Platform::detect(url) {
            Some(Platform::Reddit) => extract_reddit_posts(&html),
            Some(Platform::Twitter) => extract_tweets(&html),
            // no stable markup to read; the source still counts as scraped
            Some(Platform::Facebook) | None => Vec::new(),
        };
        posts.truncate(MAX_POSTS);
        histogram!("scrape_fetch_ms", "kind" => "social").record(t0.elapsed().as_secs_f64() * 1_000.0);

        Ok(RawSourceRecord {
            source_url: url.to_string(),
            category: Some(category.to_string()),
            articles: None,
            posts: Some(posts),
            scraped_at: Some(Utc::now()),
        })
    }
}
