// src/scrape/reddit_api.rs
//! Reddit OAuth (password grant) listing client. Used for reddit.com sources
//! when credentials are configured, instead of rendering the page.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::SourceFetcher;
use crate::config::RedditCredentials;
use crate::model::{Post, RawSourceRecord};

pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const API_BASE: &str = "https://oauth.reddit.com";
const APP_USER_AGENT: &str = "vibe_check_app/0.1";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: ChildData,
}

#[derive(Debug, Deserialize)]
struct ChildData {
    #[serde(default)]
    title: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct RedditApiFetcher {
    client: reqwest::Client,
    creds: RedditCredentials,
    token_url: String,
    api_base: String,
    limit: usize,
    token: Mutex<Option<CachedToken>>,
}

impl RedditApiFetcher {
    pub fn new(creds: RedditCredentials, timeout: Duration) -> Result<Self> {
        Self::with_endpoints(creds, timeout, TOKEN_URL, API_BASE)
    }

    /// Custom token/API endpoints (self-hosted proxies, tests).
    pub fn with_endpoints(
        creds: RedditCredentials,
        timeout: Duration,
        token_url: &str,
        api_base: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("{APP_USER_AGENT} by {}", creds.username))
            .build()
            .context("building reddit http client")?;
        Ok(Self {
            client,
            creds,
            token_url: token_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            limit: 15,
            token: Mutex::new(None),
        })
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(t) = guard.as_ref() {
            if t.expires_at > Instant::now() {
                return Ok(t.value.clone());
            }
        }

        let resp: TokenResponse = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.creds.username.as_str()),
                ("password", self.creds.password.as_str()),
            ])
            .send()
            .await
            .context("reddit token request")?
            .json()
            .await
            .context("reddit token body")?;

        if let Some(err) = resp.error {
            return Err(anyhow!("reddit token error: {err}"));
        }
        let value = resp
            .access_token
            .ok_or_else(|| anyhow!("reddit token response without access_token"))?;
        // refresh a minute early
        let ttl = resp.expires_in.unwrap_or(3600).saturating_sub(60);
        *guard = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        });
        Ok(value)
    }
}

/// `/r/<name>` from a reddit URL; `all` when there is none.
pub fn subreddit_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            let mut segs = u.path_segments()?;
            match (segs.next(), segs.next()) {
                (Some("r"), Some(name)) if !name.is_empty() => Some(name.to_string()),
                _ => None,
            }
        })
        .unwrap_or_else(|| "all".to_string())
}

#[async_trait]
impl SourceFetcher for RedditApiFetcher {
    fn name(&self) -> &'static str {
        "reddit-api"
    }

    fn handles(&self, url: &str) -> bool {
        url.contains("reddit.com")
    }

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        let token = self.access_token().await?;
        let sub = subreddit_of(url);
        let listing: Listing = self
            .client
            .get(format!("{}/r/{sub}/top", self.api_base))
            .query(&[("limit", self.limit.to_string())])
            .bearer_auth(token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("reddit listing r/{sub}"))?
            .json()
            .await
            .context("reddit listing body")?;

        let now = Utc::now();
        let posts = listing
            .data
            .children
            .into_iter()
            .map(|c| c.data.title.trim().to_string())
            .filter(|t| !t.is_empty())
            .take(self.limit)
            .map(|title| Post {
                title: Some(title),
                content: None,
                platform: "reddit".into(),
                timestamp: Some(now),
            })
            .collect();

        Ok(RawSourceRecord {
            source_url: url.to_string(),
            category: Some(category.to_string()),
            articles: None,
            posts: Some(posts),
            scraped_at: Some(now),
        })
    }
}
