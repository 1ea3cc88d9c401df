// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - GET  /api/trends, /api/trends/{category}
// - POST /api/scrape  (custom sources, empty body, bad body)
// - GET  /api/web3/status (no reachable node)

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt as _; // for `oneshot`

use vibe_check::chain::ChainClient;
use vibe_check::config::SourceMap;
use vibe_check::model::{Article, RawSourceRecord};
use vibe_check::push::PushHub;
use vibe_check::scrape::{DataScraper, SourceFetcher};
use vibe_check::{create_router, AppState, TrendStore};

const BODY_LIMIT: usize = 1024 * 1024;

/// Two crypto headlines per URL.
struct Canned;

#[async_trait]
impl SourceFetcher for Canned {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn handles(&self, _url: &str) -> bool {
        true
    }

    async fn fetch(&self, url: &str, category: &str) -> Result<RawSourceRecord> {
        let article = |title: &str| Article {
            title: title.to_string(),
            url: url.to_string(),
            source: "coindesk.com".into(),
            ..Default::default()
        };
        Ok(RawSourceRecord {
            source_url: url.to_string(),
            category: Some(category.to_string()),
            articles: Some(vec![
                article("Bitcoin price surges amid market rally"),
                article("Bitcoin adoption grows"),
            ]),
            ..Default::default()
        })
    }
}

fn test_state() -> AppState {
    let sources = SourceMap::from([(
        "crypto".to_string(),
        vec!["https://coindesk.com/tag/philippines/".to_string()],
    )]);
    AppState::new(
        Arc::new(TrendStore::default()),
        Arc::new(DataScraper::with_fetchers(vec![Arc::new(Canned)], sources, 5)),
        PushHub::new(),
        Arc::new(ChainClient::new("", &[], Duration::from_secs(1)).unwrap()),
    )
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn post_scrape(app: Router, body: Body) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/scrape")
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn health_is_ok() {
    let app = create_router(test_state());
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, bytes) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap(), "ok");
}

#[tokio::test]
async fn trends_default_to_zero_summaries() {
    let (status, v) = get_json(create_router(test_state()), "/api/trends").await;
    assert_eq!(status, StatusCode::OK);
    let obj = v.as_object().unwrap();
    assert_eq!(obj.len(), 6);
    assert_eq!(
        obj["politics"],
        json!({ "trending": [], "sentiment": "neutral", "volume": 0, "topSources": [], "keywords": [] })
    );
}

#[tokio::test]
async fn category_route_contract() {
    let state = test_state();

    let (status, v) = get_json(create_router(state.clone()), "/api/trends/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "Invalid category: weather");

    // valid, nothing computed yet
    let (status, v) = get_json(create_router(state), "/api/trends/crypto").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v.is_null());
}

#[tokio::test]
async fn scrape_with_custom_sources_updates_cache() {
    let state = test_state();
    let body = json!({ "sources": { "crypto": ["https://cointelegraph.com/tags/philippines"] } });
    let (status, v) = post_scrape(create_router(state.clone()), Body::from(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["ok"], true);
    let crypto = &v["analyzed"]["crypto"];
    assert_eq!(crypto["trending"][0]["topic"], "bitcoin");
    assert_eq!(crypto["trending"][0]["frequency"], 4);
    assert_eq!(crypto["volume"], 2);
    assert_eq!(crypto["topSources"][0], json!({ "source": "cointelegraph.com", "count": 2 }));
    assert!(crypto["lastUpdated"].is_string());

    let (_, v) = get_json(create_router(state), "/api/trends/crypto").await;
    assert_eq!(v["volume"], 2);
}

#[tokio::test]
async fn scrape_without_body_uses_configured_sources_and_pushes() {
    let state = test_state();
    let mut rx = state.push.subscribe();

    let (status, v) = post_scrape(create_router(state.clone()), Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["analyzed"]["crypto"]["topSources"][0]["source"], "coindesk.com");

    let mut events = 0;
    while rx.try_recv().is_ok() {
        events += 1;
    }
    assert_eq!(events, 6);
}

#[tokio::test]
async fn scrape_rejects_malformed_body() {
    let (status, v) = post_scrape(create_router(test_state()), Body::from("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().starts_with("invalid body"));
}

#[tokio::test]
async fn web3_status_without_node_is_disconnected() {
    let (status, v) = get_json(create_router(test_state()), "/api/web3/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["connected"], false);
    assert!(v["error"].is_string());
}
