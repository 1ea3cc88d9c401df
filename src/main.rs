//! Vibe Check service entrypoint.
//! Loads settings and sources, starts the scrape scheduler and serves the
//! dashboard API under Shuttle.

use anyhow::Context;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vibe_check::config::{load_sources_default, AppConfig};
use vibe_check::metrics::Metrics;
use vibe_check::{create_router, spawn_scheduler, AppState};

/// Compact logs; `RUST_LOG` wins, then `LOG_LEVEL`, then `vibe_check=info,warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            std::env::var("LOG_LEVEL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .and_then(|v| EnvFilter::try_new(v).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("vibe_check=info,warn"));

    // A subscriber may already be installed by the runtime.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

struct VibeCheckService {
    state: AppState,
    config: AppConfig,
}

#[shuttle_runtime::async_trait]
impl shuttle_runtime::Service for VibeCheckService {
    async fn bind(self, addr: SocketAddr) -> Result<(), shuttle_runtime::Error> {
        let metrics = Metrics::init(self.config.scrape_interval)?;
        let router = create_router(self.state.clone()).merge(metrics.router());

        let scheduler = spawn_scheduler(self.state.clone(), self.config.scrape_interval);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        tracing::info!(%addr, "vibe check listening");

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown requested");
            })
            .await
            .context("http server");

        scheduler.abort();
        if let Err(e) = self.state.scraper.close().await {
            tracing::warn!(error = ?e, "browser close failed");
        }
        served?;
        Ok(())
    }
}

#[shuttle_runtime::main]
async fn service() -> Result<VibeCheckService, shuttle_runtime::Error> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    let sources = load_sources_default().context("loading source map")?;
    tracing::info!(
        categories = sources.len(),
        interval_ms = config.scrape_interval.as_millis() as u64,
        policy = ?config.cache_policy,
        "configuration loaded"
    );

    let state = AppState::from_config(&config, sources)?;
    Ok(VibeCheckService { state, config })
}
