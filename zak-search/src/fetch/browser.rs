//! Headless Chromium page fetching over the DevTools protocol.
//!
//! One browser process serves one pipeline run. Navigation is serialized
//! through a lock because a single driver connection is not safe to drive
//! from parallel fetches.

use super::PageSource;
use crate::config::BrowserConfig;
use crate::error::SearchError;
use crate::types::FetchResult;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A launched headless browser.
///
/// Call [`close`](Self::close) to shut it down cleanly. If the source is
/// dropped instead (for example when a request is cancelled), the event
/// loop is aborted and the driver kills the child process.
pub struct BrowserPageSource {
    browser: Mutex<Option<Browser>>,
    handler: Option<JoinHandle<()>>,
    page_load_timeout: Duration,
    settle_delay: Duration,
}

impl BrowserPageSource {
    /// Launch a headless browser.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Browser`] if the executable cannot be found or
    /// fails to start.
    pub async fn launch(config: &BrowserConfig) -> Result<Self, SearchError> {
        let page_load_timeout = Duration::from_secs(config.page_load_timeout_seconds);

        let mut builder = LaunchConfig::builder().request_timeout(page_load_timeout);
        if let Some(ref path) = config.executable {
            builder = builder.chrome_executable(path);
        }
        let launch_config = builder
            .build()
            .map_err(|e| SearchError::Browser(format!("invalid launch config: {e}")))?;

        let (browser, mut events) = Browser::launch(launch_config)
            .await
            .map_err(|e| SearchError::Browser(format!("launch failed: {e}")))?;

        // The driver only makes progress while its event stream is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "browser event error");
                }
            }
        });

        tracing::debug!("headless browser launched");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: Some(handler),
            page_load_timeout,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        })
    }

    /// Close the browser and wait for the process to exit.
    pub async fn close(mut self) {
        if let Some(mut browser) = self.browser.get_mut().take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "browser close failed");
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!(error = %e, "browser process wait failed");
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        tracing::debug!("headless browser closed");
    }
}

impl Drop for BrowserPageSource {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

impl PageSource for BrowserPageSource {
    async fn fetch(&self, url: &str) -> FetchResult {
        let guard = self.browser.lock().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| SearchError::Browser("browser already closed".into()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Browser(format!("opening tab failed: {e}")))?;

        let outcome = self.render(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::trace!(error = %e, "page close failed");
        }

        outcome
    }
}

impl BrowserPageSource {
    /// Navigate an open tab to `url` and read its DOM once it has settled.
    async fn render(&self, page: &Page, url: &str) -> FetchResult {
        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation_response().await
        };
        let request = tokio::time::timeout(self.page_load_timeout, navigation)
            .await
            .map_err(|_| {
                SearchError::Timeout(format!(
                    "page load exceeded {}s",
                    self.page_load_timeout.as_secs()
                ))
            })?
            .map_err(|e| SearchError::Browser(format!("navigation failed: {e}")))?;

        check_status(
            request
                .as_ref()
                .and_then(|request| request.response.as_ref())
                .map(|response| response.status),
        )?;

        tokio::time::sleep(self.settle_delay).await;

        page.content()
            .await
            .map_err(|e| SearchError::Browser(format!("reading DOM failed: {e}")))
    }
}

/// Accept only a 2xx status for the main document.
fn check_status(status: Option<i64>) -> Result<(), SearchError> {
    match status {
        Some(code) if (200..300).contains(&code) => Ok(()),
        Some(code) => Err(SearchError::Http(format!("page returned status {code}"))),
        None => Err(SearchError::Http("page returned no response status".into())),
    }
}
