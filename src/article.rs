//! Article page download.

use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Some publishers refuse obvious bot user agents, so present as a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch the raw HTML of an article.
///
/// Transport errors, timeouts and non-2xx statuses are all errors. The
/// returned error is stripped of the request URL; callers log the URL
/// themselves.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, reqwest::Error> {
    let t0 = Instant::now();
    let body = http
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .timeout(timeout)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(reqwest::Error::without_url)?
        .text()
        .await
        .map_err(reqwest::Error::without_url)?;

    info!(
        bytes = body.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched article"
    );
    Ok(body)
}
