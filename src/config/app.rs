// src/config/app.rs
use std::env;
use std::time::Duration;

use crate::analyze::AnalyzerParams;
use crate::store::CachePolicy;

/// Upper bound for `MAX_KEYWORDS`; summaries never carry more keywords.
pub const MAX_KEYWORDS_CAP: usize = 15;

pub const DEFAULT_RPC_URL: &str = "https://sepolia.base.org";

pub const DEFAULT_FALLBACK_RPC_URLS: &[&str] = &[
    "https://sepolia.base.org",
    "https://base-sepolia.public.blastapi.io",
    "https://base-sepolia.drpc.org",
    "https://1rpc.io/base-sepolia",
];

/// Reddit password-grant credentials. All four must be set to use the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// Process-wide settings read from the environment (after `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub scrape_interval: Duration,
    pub max_concurrent_scrapes: usize,
    pub request_timeout: Duration,
    pub browser_timeout: Duration,
    pub analyzer: AnalyzerParams,
    pub cache_policy: CachePolicy,
    pub rpc_url: String,
    pub fallback_rpc_urls: Vec<String>,
    pub reddit: Option<RedditCredentials>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scrape_interval: Duration::from_millis(900_000),
            max_concurrent_scrapes: 5,
            request_timeout: Duration::from_millis(10_000),
            browser_timeout: Duration::from_millis(30_000),
            analyzer: AnalyzerParams::default(),
            cache_policy: CachePolicy::Replace,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            fallback_rpc_urls: DEFAULT_FALLBACK_RPC_URLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reddit: None,
        }
    }
}

impl AppConfig {
    /// Unset or unparsable values keep their defaults (logged at warn).
    pub fn from_env() -> Self {
        let d = Self::default();

        let analyzer = AnalyzerParams {
            sentiment_threshold: parse_env("SENTIMENT_THRESHOLD")
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(d.analyzer.sentiment_threshold),
            trend_score_multiplier: parse_env("TREND_SCORE_MULTIPLIER")
                .filter(|m: &f64| *m > 0.0)
                .unwrap_or(d.analyzer.trend_score_multiplier),
            max_keywords: parse_env("MAX_KEYWORDS")
                .filter(|n: &usize| (1..=MAX_KEYWORDS_CAP).contains(n))
                .unwrap_or(d.analyzer.max_keywords),
            ..d.analyzer
        };

        let cache_policy = match env::var("TREND_CACHE_POLICY") {
            Ok(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "TREND_CACHE_POLICY ignored");
                d.cache_policy
            }),
            Err(_) => d.cache_policy,
        };

        let fallback_rpc_urls = env::var("BASE_FALLBACK_RPC_URLS")
            .ok()
            .map(|v| split_list(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or(d.fallback_rpc_urls);

        Self {
            scrape_interval: parse_env("SCRAPE_INTERVAL_MS")
                .filter(|ms: &u64| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(d.scrape_interval),
            max_concurrent_scrapes: parse_env("MAX_CONCURRENT_SCRAPES")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(d.max_concurrent_scrapes),
            request_timeout: parse_env("REQUEST_TIMEOUT_MS")
                .filter(|ms: &u64| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(d.request_timeout),
            browser_timeout: parse_env("BROWSER_TIMEOUT_MS")
                .filter(|ms: &u64| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(d.browser_timeout),
            analyzer,
            cache_policy,
            rpc_url: env::var("BASE_RPC_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.rpc_url),
            fallback_rpc_urls,
            reddit: reddit_from_env(),
        }
    }
}

fn reddit_from_env() -> Option<RedditCredentials> {
    let get = |k: &str| env::var(k).ok().filter(|v| !v.trim().is_empty());
    Some(RedditCredentials {
        client_id: get("REDDIT_CLIENT_ID")?,
        client_secret: get("REDDIT_CLIENT_SECRET")?,
        username: get("REDDIT_USERNAME")?,
        password: get("REDDIT_PASSWORD")?,
    })
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "unparsable env value, using default");
            None
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(String::from)
        .collect()
}
