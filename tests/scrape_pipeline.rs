// tests/scrape_pipeline.rs
//
// DataScraper orchestration with in-process fetchers: routing, per-source
// failure isolation, order of results and bounded concurrency.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vibe_check::config::SourceMap;
use vibe_check::model::{Article, RawSourceRecord};
use vibe_check::scrape::{DataScraper, SourceFetcher};

/// One article titled after the URL; URLs containing "down" fail.
struct FakeNews {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeNews {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceFetcher for FakeNews {
    fn name(&self) -> &'static str {
        "fake-news"
    }

    fn handles(&self, _url: &str) -> bool {
        true
    }

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if url.contains("down") {
            bail!("connection refused: {url}");
        }
        Ok(RawSourceRecord {
            source_url: url.to_string(),
            category: Some(category.to_string()),
            articles: Some(vec![Article {
                title: format!("Headline from {url}"),
                url: url.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        })
    }
}

/// Claims reddit URLs only and returns no items.
struct FakeReddit;

#[async_trait]
impl SourceFetcher for FakeReddit {
    fn name(&self) -> &'static str {
        "fake-reddit"
    }

    fn handles(&self, url: &str) -> bool {
        url.contains("reddit.com")
    }

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        Ok(RawSourceRecord {
            source_url: url.to_string(),
            category: Some(category.to_string()),
            posts: Some(vec![]),
            ..Default::default()
        })
    }
}

fn map(entries: &[(&str, Vec<&str>)]) -> SourceMap {
    entries
        .iter()
        .map(|(c, urls)| (c.to_string(), urls.iter().map(|u| u.to_string()).collect()))
        .collect()
}

#[tokio::test]
async fn failed_sources_are_skipped_not_fatal() {
    let sources = map(&[(
        "news",
        vec!["https://a.ph", "https://down.ph", "https://b.ph"],
    )]);
    let scraper = DataScraper::with_fetchers(vec![Arc::new(FakeNews::new())], sources, 5);

    let batch = scraper.scrape_sources(None).await;
    let urls: Vec<_> = batch["news"].iter().map(|r| r.source_url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.ph", "https://b.ph"]);
}

#[tokio::test]
async fn every_category_key_is_present_even_when_all_fail() {
    let sources = map(&[
        ("crypto", vec!["https://down.one", "https://down.two"]),
        ("gaming", vec!["https://ok.gg"]),
    ]);
    let scraper = DataScraper::with_fetchers(vec![Arc::new(FakeNews::new())], sources, 2);
    let batch = scraper.scrape_sources(None).await;
    assert!(batch["crypto"].is_empty());
    assert_eq!(batch["gaming"].len(), 1);
}

#[tokio::test]
async fn first_matching_fetcher_wins() {
    let sources = map(&[(
        "social",
        vec!["https://www.reddit.com/r/Philippines/", "https://news.ph"],
    )]);
    let scraper = DataScraper::with_fetchers(
        vec![Arc::new(FakeReddit), Arc::new(FakeNews::new())],
        sources,
        5,
    );
    let batch = scraper.scrape_sources(None).await;
    let social = &batch["social"];
    assert_eq!(social.len(), 2);
    // empty records are still kept
    assert!(social[0].posts.as_ref().is_some_and(Vec::is_empty));
    assert_eq!(social[1].item_count(), 1);
}

#[tokio::test]
async fn request_sources_override_configured_map() {
    let configured = map(&[("news", vec!["https://configured.ph"])]);
    let scraper = DataScraper::with_fetchers(vec![Arc::new(FakeNews::new())], configured, 5);

    let custom = map(&[("stocks", vec!["https://custom.ph"])]);
    let batch = scraper.scrape_sources(Some(&custom)).await;
    assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["stocks"]);

    let scheduled = scraper.run_scheduled_scrape().await;
    assert_eq!(scheduled.keys().collect::<Vec<_>>(), vec!["news"]);
}

#[tokio::test]
async fn concurrency_is_bounded() {
    let urls: Vec<String> = (0..12).map(|i| format!("https://site{i}.ph")).collect();
    let sources = SourceMap::from([("news".to_string(), urls)]);
    let fetcher = Arc::new(FakeNews::new());
    let scraper = DataScraper::with_fetchers(vec![fetcher.clone()], sources, 3);

    let batch = scraper.scrape_sources(None).await;
    assert_eq!(batch["news"].len(), 12);
    let peak = fetcher.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight {peak}");
    assert!(peak >= 2, "sources were not fetched concurrently");
}

#[tokio::test]
async fn no_matching_fetcher_is_a_skipped_source() {
    let sources = map(&[("social", vec!["https://news.ph"])]);
    let scraper = DataScraper::with_fetchers(vec![Arc::new(FakeReddit)], sources, 5);
    assert!(scraper.scrape_url("https://news.ph", "social").await.is_err());
    assert!(scraper.scrape_sources(None).await["social"].is_empty());
    scraper.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scrape_runs_on_a_spawned_task() {
    let sources = map(&[
        ("news", vec!["https://a.ph", "https://down.ph", "https://b.ph"]),
        ("crypto", vec!["https://c.ph"]),
    ]);
    let scraper = Arc::new(DataScraper::with_fetchers(
        vec![Arc::new(FakeNews::new())],
        sources,
        2,
    ));

    let worker = scraper.clone();
    let batch = tokio::spawn(async move { worker.scrape_sources(None).await })
        .await
        .unwrap();
    assert_eq!(batch["news"].len(), 2);
    assert_eq!(batch["crypto"].len(), 1);

    let custom = map(&[("stocks", vec!["https://s.ph"])]);
    let worker = scraper.clone();
    let batch = tokio::spawn(async move { worker.scrape_sources(Some(&custom)).await })
        .await
        .unwrap();
    assert_eq!(batch["stocks"][0].source_url, "https://s.ph");
}
