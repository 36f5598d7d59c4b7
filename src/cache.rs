//! Time-bounded summary cache keyed by article URL.
//!
//! Entries expire a fixed time after insertion and are never refreshed by
//! reads. Expiry is checked on every lookup, so a stale summary is never
//! served even before moka's housekeeping evicts it.

use moka::future::Cache;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct SummaryCache {
    inner: Cache<String, String>,
}

impl SummaryCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, url: &str) -> Option<String> {
        let key = cache_key(url);
        let hit = self.inner.get(&key).await;
        debug!(%key, hit = hit.is_some(), "Summary cache lookup");
        hit
    }

    pub async fn set(&self, url: &str, summary: impl Into<String>) {
        self.inner.insert(cache_key(url), summary.into()).await;
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

/// Normalize an article URL into a cache key.
///
/// Parsing lowercases the scheme and host and drops default ports; the
/// fragment is removed since it never changes the fetched page. Input that
/// does not parse is used as-is after trimming.
pub fn cache_key(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.trim().to_string(),
    }
}
