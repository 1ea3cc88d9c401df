// src/scrape/browser.rs
//! Rendering of JavaScript-heavy pages.
//!
//! One headless Chromium per process, launched on first use and shared by all
//! social scrapes. Callers must `close()` it on shutdown; dropping the browser
//! kills the child process as a last resort. Built only with the `browser`
//! feature; otherwise `DisabledRenderer` fails every render and those sources
//! are skipped.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to `url` and return the rendered DOM as HTML.
    async fn render(&self, url: &str, timeout: Duration) -> Result<String>;

    /// Release the underlying browser. Safe to call more than once.
    async fn close(&self) -> Result<()>;
}

/// Renderer for builds without a browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRenderer;

#[async_trait]
impl PageRenderer for DisabledRenderer {
    async fn render(&self, url: &str, _timeout: Duration) -> Result<String> {
        anyhow::bail!("browser rendering disabled (build with feature `browser`): {url}")
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(feature = "browser")]
pub use chrome::ChromeRenderer;

/// Default renderer for this build.
pub fn default_renderer() -> std::sync::Arc<dyn PageRenderer> {
    #[cfg(feature = "browser")]
    {
        std::sync::Arc::new(ChromeRenderer::new())
    }
    #[cfg(not(feature = "browser"))]
    {
        std::sync::Arc::new(DisabledRenderer)
    }
}

#[cfg(feature = "browser")]
mod chrome {
    use super::{PageRenderer, USER_AGENT};
    use anyhow::{anyhow, Context, Result};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    struct Running {
        browser: Browser,
        handler: JoinHandle<()>,
    }

    /// Lazily launched, shared headless Chromium. Renders are serialized on
    /// the handle lock.
    #[derive(Default)]
    pub struct ChromeRenderer {
        inner: Mutex<Option<Running>>,
    }

    impl ChromeRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        async fn launch() -> Result<Running> {
            let config = BrowserConfig::builder()
                .no_sandbox()
                .arg("--disable-setuid-sandbox")
                .build()
                .map_err(|e| anyhow!("browser config: {e}"))?;
            let (browser, mut handler) = Browser::launch(config)
                .await
                .context("launching headless chromium")?;
            let handler = tokio::spawn(async move {
                while let Some(ev) = handler.next().await {
                    if ev.is_err() {
                        break;
                    }
                }
            });
            tracing::info!(target: "scrape", "headless browser launched");
            Ok(Running { browser, handler })
        }
    }

    #[async_trait]
    impl PageRenderer for ChromeRenderer {
        async fn render(&self, url: &str, timeout: Duration) -> Result<String> {
            let mut guard = self.inner.lock().await;
            if guard.is_none() {
                *guard = Some(Self::launch().await?);
            }
            let running = guard
                .as_ref()
                .ok_or_else(|| anyhow!("browser not running"))?;

            let page = running
                .browser
                .new_page("about:blank")
                .await
                .context("opening page")?;
            page.set_user_agent(USER_AGENT)
                .await
                .context("setting user agent")?;

            let rendered = tokio::time::timeout(timeout, async {
                page.goto(url).await?;
                page.wait_for_navigation().await?;
                page.content().await
            })
            .await;

            // close the tab whatever happened to the navigation
            if let Err(e) = page.close().await {
                tracing::debug!(target: "scrape", error = ?e, "page close failed");
            }

            match rendered {
                Ok(html) => html.with_context(|| format!("rendering {url}")),
                Err(_) => Err(anyhow!("navigation timeout after {timeout:?}: {url}")),
            }
        }

        async fn close(&self) -> Result<()> {
            let mut guard = self.inner.lock().await;
            if let Some(mut running) = guard.take() {
                running.browser.close().await.context("closing browser")?;
                let _ = running.browser.wait().await;
                running.handler.abort();
                tracing::info!(target: "scrape", "headless browser closed");
            }
            Ok(())
        }
    }
}
