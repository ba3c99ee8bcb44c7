//! Page retrieval behind a strategy-agnostic contract.
//!
//! [`PageSource`] fetches raw markup for one URL. [`PageSourceFactory`]
//! hands out a request-scoped source and takes it back once every URL has
//! been processed, which is where the browser strategy launches and tears
//! down its driver.
//!
//! [`PageFetcher`] is the configuration-driven factory used in production:
//! it yields a [`ConfiguredPageSource`] for whichever [`FetchStrategy`] is
//! selected.

pub mod http;

#[cfg(feature = "browser")]
pub mod browser;

use crate::config::{FetchConfig, FetchStrategy};
use crate::error::SearchError;
use crate::types::FetchResult;
use std::future::Future;

pub use http::HttpPageSource;

#[cfg(feature = "browser")]
pub use browser::BrowserPageSource;

/// Retrieves raw markup for one URL.
///
/// Implementations enforce their own per-page deadline, make a single
/// attempt, and report network errors, timeouts and non-success responses
/// as `Err` so the caller can skip the page.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send;
}

/// Hands out request-scoped [`PageSource`]s.
pub trait PageSourceFactory: Send + Sync {
    type Source: PageSource;

    /// Acquire a source for one pipeline run.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the underlying driver cannot start.
    fn acquire(&self) -> impl Future<Output = Result<Self::Source, SearchError>> + Send;

    /// Release a source once all of its URLs have been processed.
    fn release(&self, source: Self::Source) -> impl Future<Output = ()> + Send {
        async move { drop(source) }
    }
}

/// A page source for the configured strategy.
pub enum ConfiguredPageSource {
    Http(HttpPageSource),
    #[cfg(feature = "browser")]
    Browser(BrowserPageSource),
}

impl PageSource for ConfiguredPageSource {
    async fn fetch(&self, url: &str) -> FetchResult {
        match self {
            Self::Http(source) => source.fetch(url).await,
            #[cfg(feature = "browser")]
            Self::Browser(source) => source.fetch(url).await,
        }
    }
}

/// Configuration-driven [`PageSourceFactory`].
///
/// The HTTP client is built once and shared by every request; a browser is
/// launched per pipeline run and closed on release.
pub struct PageFetcher {
    config: FetchConfig,
    http: HttpPageSource,
}

impl PageFetcher {
    /// Create a fetcher from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, SearchError> {
        let http = HttpPageSource::new(&config)?;
        Ok(Self { config, http })
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.config.strategy
    }
}

impl PageSourceFactory for PageFetcher {
    type Source = ConfiguredPageSource;

    async fn acquire(&self) -> Result<ConfiguredPageSource, SearchError> {
        match self.config.strategy {
            FetchStrategy::Http => Ok(ConfiguredPageSource::Http(self.http.clone())),
            #[cfg(feature = "browser")]
            FetchStrategy::Browser => {
                let browser = BrowserPageSource::launch(&self.config.browser).await?;
                Ok(ConfiguredPageSource::Browser(browser))
            }
            #[cfg(not(feature = "browser"))]
            FetchStrategy::Browser => Err(SearchError::Config(
                "browser fetch strategy requires the `browser` feature".into(),
            )),
        }
    }

    async fn release(&self, source: ConfiguredPageSource) {
        match source {
            ConfiguredPageSource::Http(_) => {}
            #[cfg(feature = "browser")]
            ConfiguredPageSource::Browser(browser) => browser.close().await,
        }
    }
}
