//! HTTP surface: shared state, router and handlers.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/` | [`root_handler`] |
//! | GET | `/health` | [`health_handler`] |
//! | GET | `/api/news` | [`news_handler`] |
//! | POST | `/summarize` | [`summarize_handler`] (rate limited) |
//!
//! Requests carrying an `Origin` outside the allow-list are refused with 403
//! before routing; the rest get CORS headers from tower-http.

use crate::article::fetch_article;
use crate::cache::SummaryCache;
use crate::config::Settings;
use crate::errors::ApiError;
use crate::extract::extract_text;
use crate::inference::{InferenceClient, InferenceOutcome};
use crate::models::{HealthResponse, NewsQuery, SummarizeRequest, SummaryResponse};
use crate::news::NewsRelay;
use crate::rate_limit::{SlidingWindowLimiter, enforce_rate_limit};
use crate::readiness::{Readiness, warm_up};
use crate::summarizer::{DEFAULT_SENTENCES, fallback_summary};
use crate::utils::{timestamp, truncate_for_log};
use axum::{
    Json, Router,
    extract::{Query, Request, State, rejection::JsonRejection},
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};
use url::Url;

pub const LIVENESS_MESSAGE: &str = "News digest backend is running";
const SUMMARIZE_FAILED: &str = "Failed to summarize article";

/// Process-wide state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub http: reqwest::Client,
    pub inference: Arc<InferenceClient>,
    pub news: Arc<NewsRelay>,
    pub cache: SummaryCache,
    pub readiness: Arc<Readiness>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub article_timeout: Duration,
    pub trust_proxy_headers: bool,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            inference: Arc::new(InferenceClient::new(
                http.clone(),
                settings.inference_endpoint.clone(),
                settings.inference_api_key.clone(),
                settings.inference_timeout(),
            )),
            news: Arc::new(NewsRelay::new(
                http.clone(),
                settings.news_endpoint.clone(),
                settings.news_api_key.clone(),
                settings.news_timeout(),
            )),
            cache: SummaryCache::new(settings.cache_ttl(), settings.cache_max_entries),
            readiness: Arc::new(Readiness::new(false)),
            limiter: Arc::new(SlidingWindowLimiter::new(
                settings.rate_limit_max_requests,
                settings.rate_limit_window(),
            )),
            article_timeout: settings.article_timeout(),
            trust_proxy_headers: settings.trust_proxy_headers,
            http,
        })
    }
}

/// Build the application router.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Arc<[HeaderValue]> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparseable allowed origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    let summarize = Router::new()
        .route("/summarize", post(summarize_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/news", get(news_handler))
        .merge(summarize)
        // Layers run bottom-up: the origin check sees requests before CORS.
        .layer(cors)
        .layer(middleware::from_fn_with_state(origins, reject_unlisted_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn reject_unlisted_origin(
    State(allowed): State<Arc<[HeaderValue]>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        if !allowed.contains(origin) {
            warn!(
                origin = ?origin,
                path = %request.uri().path(),
                "Rejected request from unlisted origin"
            );
            return ApiError::OriginRejected.into_response();
        }
    }
    next.run(request).await
}

pub async fn root_handler() -> &'static str {
    LIVENESS_MESSAGE
}

/// Warm the model and report whether it answered.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match warm_up(&state).await {
        Ok(summary) => (StatusCode::OK, Json(HealthResponse::ok(summary))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::error(e.to_string())),
        ),
    }
}

pub async fn news_handler(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.news.top_headlines(&query).await.map(Json)
}

/// Summarize the article at the requested URL.
///
/// Cached summaries are served without touching any upstream. Otherwise the
/// page is fetched, reduced to text and sent to the model; if the model
/// fails, the first sentences of the text stand in for its summary.
#[instrument(level = "info", skip_all, fields(url = tracing::field::Empty))]
pub async fn summarize_handler(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected summarize body");
        ApiError::InvalidRequest(rejection.body_text())
    })?;
    let url = validate_article_url(&request.url)?;
    tracing::Span::current().record("url", url.as_str());

    if let Some(summary) = state.cache.get(&url).await {
        info!("Serving cached summary");
        return Ok(Json(SummaryResponse { summary }));
    }

    if !state.readiness.is_ready() {
        warn!("Summarize requested before model warm-up completed");
        return Err(ApiError::ModelNotReady);
    }

    let html = fetch_article(&state.http, &url, state.article_timeout)
        .await
        .map_err(|e| {
            error!(error = %e, %url, timestamp = %timestamp(), "Article fetch failed");
            ApiError::Upstream {
                error: SUMMARIZE_FAILED,
                details: e.to_string(),
            }
        })?;

    let text = extract_text(&html);

    let summary = match state.inference.summarize(&text).await {
        InferenceOutcome::Summary(summary) => summary,
        InferenceOutcome::Failed(failure) => {
            warn!(
                error = %failure.error,
                snippet = %failure.snippet,
                "Inference failed; using extractive fallback"
            );
            fallback_summary(&text, DEFAULT_SENTENCES)
        }
    };

    state.cache.set(&url, summary.clone()).await;
    info!(summary = %truncate_for_log(&summary, 80), "Summarized article");
    Ok(Json(SummaryResponse { summary }))
}

/// Accept absolute http(s) URLs only.
fn validate_article_url(raw: &str) -> Result<String, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::InvalidRequest("URL is required".to_string()));
    }
    let parsed = Url::parse(raw)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(ApiError::InvalidRequest(format!(
            "Unsupported URL scheme: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{MODEL_LOADING, ORIGIN_NOT_ALLOWED, TOO_MANY_REQUESTS};
    use crate::inference::TOO_SHORT;
    use crate::test_support::spawn_upstream;
    use axum::body::{Body, to_bytes};
    use axum::extract::ConnectInfo;
    use axum::http::{HeaderMap, header};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const ALLOWED: &str = "http://localhost:3000";
    const MODEL_SUMMARY: &str = "Storm shuts county schools.";

    const ARTICLE_HTML: &str = r#"<html><head>
        <script>trackVisitor();</script><style>p { margin: 0 }</style></head>
        <body><h1>Storm closes schools.</h1>
        <p>Schools across the county closed on Monday as a winter storm arrived.</p>
        <p>Officials expect the roads to clear by Wednesday.</p>
        <p>Buses will run on a delayed schedule.</p>
        <p>Parents should check the district website.</p></body></html>"#;

    /// Counters for the fake article host and inference endpoint.
    #[derive(Clone, Default)]
    struct Calls {
        article: Arc<AtomicUsize>,
        inference: Arc<AtomicUsize>,
    }

    #[derive(Clone, Copy)]
    enum ModelBehaviour {
        Summarize,
        Fail,
    }

    async fn spawn_fake_services(calls: Calls, model: ModelBehaviour) -> SocketAddr {
        let article_calls = calls.article.clone();
        let inference_calls = calls.inference.clone();
        let router = Router::new()
            .route(
                "/article",
                get(move || {
                    article_calls.fetch_add(1, Ordering::SeqCst);
                    async { ARTICLE_HTML }
                }),
            )
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/model",
                post(move || {
                    inference_calls.fetch_add(1, Ordering::SeqCst);
                    let fail = matches!(model, ModelBehaviour::Fail);
                    async move {
                        if fail {
                            let body = serde_json::json!({ "error": "loading" });
                            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
                        } else {
                            let body = serde_json::json!([{ "summary_text": MODEL_SUMMARY }]);
                            (StatusCode::OK, Json(body))
                        }
                    }
                }),
            )
            .route(
                "/news",
                get(|Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    if q.get("country").map(String::as_str) == Some("xx") {
                        let body = serde_json::json!({
                            "status": "error",
                            "message": "provider exploded"
                        });
                        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body));
                    }
                    (StatusCode::OK, Json(serde_json::json!({ "echo": q })))
                }),
            );
        spawn_upstream(router).await
    }

    fn test_settings(addr: SocketAddr) -> Settings {
        Settings {
            news_api_key: "news-secret".into(),
            inference_api_key: "hf-secret".into(),
            allowed_origins: vec![ALLOWED.into()],
            news_endpoint: format!("http://{addr}/news"),
            inference_endpoint: format!("http://{addr}/model"),
            rate_limit_max_requests: 50,
            ..Default::default()
        }
    }

    fn test_app(settings: &Settings, ready: bool) -> (Router, AppState) {
        let state = AppState::from_settings(settings).unwrap();
        state.readiness.set(ready);
        (build_router(state.clone(), &settings.allowed_origins), state)
    }

    fn summarize_request(url: &str) -> axum::http::Request<Body> {
        axum::http::Request::post("/summarize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "url": url }).to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(uri).body(Body::empty()).unwrap()
    }

    fn app_with_default_origins() -> Router {
        let settings = Settings {
            allowed_origins: vec![ALLOWED.into()],
            ..Default::default()
        };
        test_app(&settings, false).0
    }

    async fn send(
        app: &Router,
        request: axum::http::Request<Body>,
    ) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_root_liveness() {
        let (app, _) = test_app(&Settings::default(), false);
        let (status, _, body) = send(&app, get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_summarize_rejected_while_model_loading() {
        let calls = Calls::default();
        let addr = spawn_fake_services(calls.clone(), ModelBehaviour::Summarize).await;
        let (app, _) = test_app(&test_settings(addr), false);

        let url = format!("http://{addr}/article");
        let (status, _, body) = send(&app, summarize_request(&url)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json(&body)["error"], MODEL_LOADING);
        assert_eq!(calls.article.load(Ordering::SeqCst), 0);
        assert_eq!(calls.inference.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cached_summary_served_even_when_not_ready() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let (app, state) = test_app(&test_settings(addr), false);
        let url = format!("http://{addr}/article");
        state.cache.set(&url, "cached summary").await;

        let (status, _, body) = send(&app, summarize_request(&url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["summary"], "cached summary");
    }

    #[tokio::test]
    async fn test_summarize_uses_model_and_caches() {
        let calls = Calls::default();
        let addr = spawn_fake_services(calls.clone(), ModelBehaviour::Summarize).await;
        let (app, state) = test_app(&test_settings(addr), true);
        let url = format!("http://{addr}/article");

        for _ in 0..2 {
            let (status, _, body) = send(&app, summarize_request(&url)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json(&body)["summary"], MODEL_SUMMARY);
        }

        assert_eq!(calls.article.load(Ordering::SeqCst), 1);
        assert_eq!(calls.inference.load(Ordering::SeqCst), 1);
        assert_eq!(
            state.cache.get(&url).await.as_deref(),
            Some(MODEL_SUMMARY)
        );
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_first_sentences() {
        let calls = Calls::default();
        let addr = spawn_fake_services(calls.clone(), ModelBehaviour::Fail).await;
        let (app, _) = test_app(&test_settings(addr), true);

        let url = format!("http://{addr}/article");
        let (status, _, body) = send(&app, summarize_request(&url)).await;
        assert_eq!(status, StatusCode::OK);
        let summary = json(&body)["summary"].as_str().unwrap().to_string();
        assert_eq!(
            summary,
            "Storm closes schools. Schools across the county closed on Monday as a winter storm arrived. \
             Officials expect the roads to clear by Wednesday."
        );
        assert!(!summary.contains("trackVisitor"));
        assert_eq!(calls.inference.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_article_is_not_sent_to_model() {
        let calls = Calls::default();
        let inference_calls = calls.inference.clone();
        let router = Router::new()
            .route("/tiny", get(|| async { "<p>Brief.</p>" }))
            .route(
                "/model",
                post(move || {
                    inference_calls.fetch_add(1, Ordering::SeqCst);
                    async { Json(serde_json::json!([{ "summary_text": "x" }])) }
                }),
            );
        let addr = spawn_upstream(router).await;
        let (app, _) = test_app(&test_settings(addr), true);

        let url = format!("http://{addr}/tiny");
        let (status, _, body) = send(&app, summarize_request(&url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["summary"], TOO_SHORT);
        assert_eq!(calls.inference.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_500_with_details() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let (app, state) = test_app(&test_settings(addr), true);
        let url = format!("http://{addr}/missing");

        let (status, _, body) = send(&app, summarize_request(&url)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(&body);
        assert_eq!(body["error"], SUMMARIZE_FAILED);
        assert!(body["details"].as_str().unwrap().contains("404"));
        assert_eq!(state.cache.get(&url).await, None);
    }

    #[tokio::test]
    async fn test_invalid_url_is_400() {
        let (app, _) = test_app(&Settings::default(), true);
        for url in ["", "not a url", "ftp://example.com/file"] {
            let (status, _, body) = send(&app, summarize_request(url)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{url:?}");
            assert!(json(&body)["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_400() {
        let (app, _) = test_app(&Settings::default(), true);
        let request = axum::http::Request::post("/summarize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(json(&body)["error"].as_str().unwrap().contains("JSON"));
    }

    #[tokio::test]
    async fn test_body_without_content_type_is_json_400() {
        let (app, _) = test_app(&Settings::default(), true);
        let request = axum::http::Request::post("/summarize")
            .body(Body::from(r#"{"url":"https://example.com/a"}"#))
            .unwrap();

        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(json(&body)["error"].as_str().unwrap().contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_request_over_cap() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let settings = Settings {
            rate_limit_max_requests: 3,
            ..test_settings(addr)
        };
        let (app, _) = test_app(&settings, true);
        let url = format!("http://{addr}/article");

        for _ in 0..3 {
            let (status, _, _) = send(&app, summarize_request(&url)).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _, body) = send(&app, summarize_request(&url)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json(&body)["error"], TOO_MANY_REQUESTS);

        // Another client still gets through.
        let other = from_peer(summarize_request(&url), "192.0.2.20:4000");
        let (status, _, _) = send(&app, other).await;
        assert_eq!(status, StatusCode::OK);
    }

    fn from_peer(mut request: axum::http::Request<Body>, peer: &str) -> axum::http::Request<Body> {
        let peer: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    }

    fn with_forwarded_for(
        mut request: axum::http::Request<Body>,
        ip: &str,
    ) -> axum::http::Request<Body> {
        request
            .headers_mut()
            .insert("x-forwarded-for", HeaderValue::from_str(ip).unwrap());
        request
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_evade_rate_limit() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let settings = Settings {
            rate_limit_max_requests: 2,
            ..test_settings(addr)
        };
        let (app, _) = test_app(&settings, true);
        let url = format!("http://{addr}/article");

        let mut codes = Vec::new();
        for i in 0..4 {
            let request = with_forwarded_for(summarize_request(&url), &format!("10.0.0.{i}"));
            let (status, _, _) = send(&app, from_peer(request, "192.0.2.10:5555")).await;
            codes.push(status);
        }
        assert_eq!(
            codes,
            vec![
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[tokio::test]
    async fn test_trusted_proxy_headers_identify_clients() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let settings = Settings {
            rate_limit_max_requests: 1,
            trust_proxy_headers: true,
            ..test_settings(addr)
        };
        let (app, _) = test_app(&settings, true);
        let url = format!("http://{addr}/article");

        // All requests arrive through the same proxy peer.
        for ip in ["203.0.113.1", "203.0.113.2"] {
            let request = with_forwarded_for(summarize_request(&url), ip);
            let (status, _, _) = send(&app, from_peer(request, "10.1.1.1:443")).await;
            assert_eq!(status, StatusCode::OK, "{ip}");
        }
        let request = with_forwarded_for(summarize_request(&url), "203.0.113.1");
        let (status, _, _) = send(&app, from_peer(request, "10.1.1.1:443")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_rate_limit_does_not_apply_to_other_routes() {
        let settings = Settings {
            rate_limit_max_requests: 1,
            ..Settings::default()
        };
        let (app, _) = test_app(&settings, false);
        for _ in 0..3 {
            let (status, _, _) = send(&app, get_request("/")).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_news_relay_passes_through_body() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let (app, _) = test_app(&test_settings(addr), false);

        let request = get_request("/api/news?country=us&category=general&page=1&pageSize=5");
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json(&body),
            serde_json::json!({ "echo": {
                "country": "us",
                "category": "general",
                "page": "1",
                "pageSize": "5",
                "apiKey": "news-secret"
            }})
        );
    }

    #[tokio::test]
    async fn test_news_relay_upstream_failure_is_500() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let (app, _) = test_app(&test_settings(addr), false);

        let request = get_request("/api/news?country=xx");
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(&body);
        assert_eq!(body["error"], "Failed to fetch news");
        assert_eq!(body["details"], "provider exploded");
    }

    #[tokio::test]
    async fn test_health_marks_model_ready() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Summarize).await;
        let (app, state) = test_app(&test_settings(addr), false);

        let (status, _, body) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json(&body),
            serde_json::json!({ "status": "ok", "summary": MODEL_SUMMARY })
        );
        assert!(state.readiness.is_ready());
    }

    #[tokio::test]
    async fn test_health_failure_clears_readiness() {
        let addr = spawn_fake_services(Calls::default(), ModelBehaviour::Fail).await;
        let (app, state) = test_app(&test_settings(addr), true);

        let (status, _, body) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(&body);
        assert_eq!(body["status"], "error");
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("503"), "{error}");
        assert!(!error.contains("hf-secret"));
        assert!(!state.readiness.is_ready());
    }

    #[tokio::test]
    async fn test_startup_probe_warms_model() {
        let calls = Calls::default();
        let addr = spawn_fake_services(calls.clone(), ModelBehaviour::Summarize).await;
        let state = AppState::from_settings(&test_settings(addr)).unwrap();

        crate::readiness::spawn_startup_probe(state.clone(), Duration::from_millis(10))
            .await
            .unwrap();
        assert!(state.readiness.is_ready());
        assert_eq!(calls.inference.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unlisted_origin_is_rejected() {
        let app = app_with_default_origins();
        let request = axum::http::Request::get("/")
            .header(ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json(&body)["error"], ORIGIN_NOT_ALLOWED);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_listed_origin_gets_cors_headers() {
        let app = app_with_default_origins();
        let request = axum::http::Request::get("/")
            .header(ORIGIN, ALLOWED)
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_preflight_from_listed_origin() {
        let app = app_with_default_origins();
        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/summarize")
            .header(ORIGIN, ALLOWED)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&app, request).await;
        assert!(status.is_success());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("POST"));
    }

    #[test]
    fn test_validate_article_url() {
        assert_eq!(
            validate_article_url("  https://example.com/a ").unwrap(),
            "https://example.com/a"
        );
        assert!(matches!(
            validate_article_url("mailto:someone@example.com"),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
