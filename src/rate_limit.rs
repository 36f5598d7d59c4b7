//! Sliding-window rate limiting for the summarize endpoint.
//!
//! Each client identity keeps a log of the instants of its admitted requests.
//! A request is admitted while fewer than `max_requests` of those instants lie
//! inside the trailing window. Rejected requests are not logged, so a client
//! that keeps hammering regains access as soon as its oldest hit ages out.
//!
//! Client identity priority:
//! 1. X-Forwarded-For header (first address), if proxy headers are trusted
//! 2. X-Real-IP header, if proxy headers are trusted
//! 3. ConnectInfo socket address
//! 4. the literal `unknown`
//!
//! Proxy headers are client-controlled unless a reverse proxy rewrites them,
//! so they are ignored by default.

use crate::errors::ApiError;
use crate::server::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

pub const DEFAULT_MAX_REQUESTS: usize = 50;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request from `client` and report whether it is admitted.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let log = hits.entry(client.to_owned()).or_default();
        self.expire(log, now);

        if log.len() >= self.max_requests {
            return false;
        }
        log.push_back(now);
        true
    }

    /// Forget clients with no hits left inside the window.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        hits.retain(|_, log| {
            self.expire(log, now);
            !log.is_empty()
        });
    }

    fn expire(&self, log: &mut VecDeque<Instant>, now: Instant) {
        while log
            .front()
            .is_some_and(|&at| now.saturating_duration_since(at) >= self.window)
        {
            log.pop_front();
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.hits.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

/// Work out who is calling, for rate-limiting purposes.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    let proxied = trust_proxy_headers.then(|| forwarded_ip(headers)).flatten();

    proxied
        .or_else(|| peer.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Middleware rejecting requests over the per-client cap with 429.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer, state.trust_proxy_headers);

    if !state.limiter.check(&client) {
        warn!(%client, path = %request.uri().path(), "Rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}
