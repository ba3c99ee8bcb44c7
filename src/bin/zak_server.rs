//! zak HTTP server.
//!
//! Loads configuration (`.env`, optional `ZAK_CONFIG` TOML file, environment),
//! wires the search engine, page fetcher and Gemini composer into one shared
//! pipeline, and serves it until Ctrl-C.

use anyhow::Context as _;
use std::sync::Arc;
use zak::answer::GeminiComposer;
use zak::config::QaConfig;
use zak::pipeline::QueryPipeline;
use zak_search::{PageFetcher, SerpApiEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("zak=info,zak_search=info,tower_http=info")
            }),
        )
        .init();

    let config = QaConfig::load().context("invalid configuration")?;
    tracing::info!(
        strategy = %config.fetch.strategy,
        concurrency = config.fetch.concurrency,
        max_results = config.search.max_results,
        model = %config.llm.model,
        "zak starting"
    );

    let finder = SerpApiEngine::new(config.search.clone()).context("search engine")?;
    let pages = PageFetcher::new(config.fetch.clone()).context("page fetcher")?;
    let composer = GeminiComposer::new(&config.llm).context("Gemini client")?;
    let pipeline = Arc::new(QueryPipeline::new(
        finder,
        pages,
        composer,
        config.fetch.concurrency,
    ));

    let app = zak::server::router(pipeline, &config.server);
    zak::server::serve(app, &config.server, shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "server exited with error");
            anyhow::anyhow!("zak server failed: {e}")
        })?;

    tracing::info!("zak shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
