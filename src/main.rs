//! # News Digest
//!
//! A small backend that sits between a news front end and two third-party
//! services, keeping their API keys on the server.
//!
//! ## Features
//!
//! - Relays top-headline queries to the news provider (`GET /api/news`)
//! - Summarizes an article by URL (`POST /summarize`) through a hosted
//!   summarization model, falling back to an extractive summary when the
//!   model fails
//! - Caches summaries per URL for an hour
//! - Rate limits summarization per client with a sliding window
//! - Warms the model at startup and on `GET /health`
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... HUGGINGFACE_API_KEY=... news_digest --port 5000
//! ```
//!
//! ## Architecture
//!
//! A summarize request runs as a short pipeline:
//! 1. **Cache**: return a stored summary for the URL if one is live
//! 2. **Readiness**: refuse with 503 until the model has answered once
//! 3. **Fetching**: download the article page
//! 4. **Extraction**: strip markup down to a bounded text snippet
//! 5. **Summarizing**: ask the model, or keep the first sentences on failure
//! 6. **Caching**: store the summary under the URL

use clap::Parser;
use std::error::Error;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod article;
mod cache;
mod cli;
mod config;
mod errors;
mod extract;
mod inference;
mod models;
mod news;
mod rate_limit;
mod readiness;
mod server;
mod summarizer;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use config::Settings;
use readiness::spawn_startup_probe;
use server::{AppState, build_router};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news_digest starting up");

    // .env is optional; real deployments set the environment directly.
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }

    let args = Cli::parse();
    let settings = Settings::load(&args)?;
    debug!(?settings, "Resolved settings");
    settings.warn_on_missing_credentials();

    let state = AppState::from_settings(&settings)?;
    let app = build_router(state.clone(), &settings.allowed_origins);

    // Forget idle rate-limit clients once per window.
    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let period = limiter.window().max(std::time::Duration::from_secs(1));
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            limiter.sweep();
        }
    });

    spawn_startup_probe(state, settings.warmup_delay());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        allowed_origins = ?settings.allowed_origins,
        "Listening for requests"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("news_digest shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
