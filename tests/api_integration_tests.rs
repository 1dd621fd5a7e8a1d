//! Integration Tests for API Endpoints
//!
//! Drives the full router with a stub upstream so no network is touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use buzz_image_proxy::{
    api::create_router,
    cache::{CacheLimits, ImageCache},
    proxy::{FetchedImage, ImageFetcher, FALLBACK_PNG, MAX_IMAGE_BYTES},
    AppState, ProxyError, Result,
};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

// == Stub Upstream ==

/// Serves canned bodies per URL and counts every fetch.
#[derive(Default)]
struct StubUpstream {
    images: HashMap<String, (Bytes, Option<String>)>,
    calls: AtomicUsize,
}

impl StubUpstream {
    fn with(mut self, url: &str, body: Vec<u8>, content_type: Option<&str>) -> Self {
        self.images
            .insert(url.to_string(), (Bytes::from(body), content_type.map(str::to_string)));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubUpstream {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.images.get(url) {
            Some((body, content_type)) => Ok(FetchedImage {
                body: body.clone(),
                content_type: content_type.clone(),
            }),
            None => Err(ProxyError::UpstreamStatus(404)),
        }
    }
}

// == Helper Functions ==

const CAT: &str = "https://img.example.com/cat.jpg";

fn app_with(upstream: Arc<StubUpstream>, limits: CacheLimits) -> (Router, AppState) {
    let state = AppState::new(ImageCache::new(limits), upstream);
    (create_router(state.clone()), state)
}

fn default_app(upstream: Arc<StubUpstream>) -> Router {
    app_with(upstream, CacheLimits::default()).0
}

fn proxy_uri(url: &str, skip_cache: bool) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    if skip_cache {
        format!("/api/proxy/image?url={}&skip_cache=true", encoded)
    } else {
        format!("/api/proxy/image?url={}", encoded)
    }
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

async fn body_to_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn content_type(response: &Response) -> &str {
    response.headers()[header::CONTENT_TYPE].to_str().unwrap()
}

async fn assert_fallback(response: Response) {
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/png");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=86400"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_bytes(response).await, *FALLBACK_PNG);
}

// == Successful Proxying ==

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let upstream = Arc::new(StubUpstream::default().with(CAT, vec![0xD8; 2048], Some("image/jpeg")));
    let app = default_app(upstream.clone());

    let first = get(&app, &proxy_uri(CAT, false)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(content_type(&first), "image/jpeg");
    assert_eq!(first.headers()[header::CACHE_CONTROL], "public, max-age=86400");
    assert_eq!(first.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let first = body_bytes(first).await;

    let second = body_bytes(get(&app, &proxy_uri(CAT, false)).await).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 2048);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_skip_cache_fetches_every_time() {
    let upstream = Arc::new(StubUpstream::default().with(CAT, vec![0xD8; 512], Some("image/jpeg")));
    let app = default_app(upstream.clone());

    get(&app, &proxy_uri(CAT, true)).await;
    get(&app, &proxy_uri(CAT, true)).await;

    assert_eq!(upstream.calls(), 2);
}

#[tokio::test]
async fn test_webp_content_type_is_preserved() {
    let url = "https://img.example.com/a.webp";
    let upstream = Arc::new(StubUpstream::default().with(url, vec![0x52; 400], Some("image/webp")));
    let app = default_app(upstream);

    let response = get(&app, &proxy_uri(url, false)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/webp");
}

#[tokio::test]
async fn test_unsupported_content_type_served_as_jpeg() {
    let url = "https://img.example.com/page";
    let html = b"<html>".repeat(50);
    let upstream = Arc::new(StubUpstream::default().with(url, html.clone(), Some("text/html")));
    let app = default_app(upstream);

    let response = get(&app, &proxy_uri(url, false)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/jpeg");
    assert_eq!(body_bytes(response).await, Bytes::from(html));
}

#[tokio::test]
async fn test_repeated_query_parameters_use_first_value() {
    let dog = "https://img.example.com/dog.png";
    let upstream = Arc::new(
        StubUpstream::default()
            .with(CAT, vec![0xD8; 300], Some("image/jpeg"))
            .with(dog, vec![0x89; 400], Some("image/png")),
    );
    let (app, state) = app_with(upstream.clone(), CacheLimits::default());
    let cat: String = url::form_urlencoded::byte_serialize(CAT.as_bytes()).collect();
    let dog_encoded: String = url::form_urlencoded::byte_serialize(dog.as_bytes()).collect();

    let uri = format!("/api/proxy/image?url={}&url={}", cat, dog_encoded);
    let response = get(&app, &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/jpeg");
    assert_eq!(body_bytes(response).await.len(), 300);
    assert!(state.cache.contains(CAT));
    assert!(!state.cache.contains(dog));

    // First skip_cache wins as well
    let uri = format!("/api/proxy/image?url={}&skip_cache=true&skip_cache=false", cat);
    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.calls(), 2);
}

// == Fallback Contract ==

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let upstream = Arc::new(StubUpstream::default());
    let app = default_app(upstream.clone());

    let response = get(&app, "/api/proxy/image").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(body_bytes(response).await, "Image URL is required");
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_empty_url_is_bad_request() {
    let app = default_app(Arc::new(StubUpstream::default()));

    let response = get(&app, "/api/proxy/image?url=").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blocked_targets_get_fallback() {
    let upstream = Arc::new(StubUpstream::default());
    let app = default_app(upstream.clone());

    for url in [
        "http://localhost/x",
        "http://127.0.0.1/x",
        "http://10.0.0.5/x",
        "http://172.20.1.1/x",
        "http://192.168.0.10/x",
        "http://[::1]/x",
        "file:///etc/passwd",
        "data:image/png;base64,AAAA",
        "ftp://files.example.com/a.png",
        "not a url at all",
    ] {
        assert_fallback(get(&app, &proxy_uri(url, false)).await).await;
    }

    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_upstream_error_gets_fallback_and_is_not_cached() {
    let upstream = Arc::new(StubUpstream::default());
    let (app, state) = app_with(upstream.clone(), CacheLimits::default());

    assert_fallback(get(&app, &proxy_uri(CAT, false)).await).await;
    assert_fallback(get(&app, &proxy_uri(CAT, false)).await).await;

    assert!(state.cache.is_empty());
    assert_eq!(upstream.calls(), 2);
}

// == Size Bounds ==

#[tokio::test]
async fn test_payload_size_bounds() {
    let tiny = "https://img.example.com/tiny.png";
    let min = "https://img.example.com/min.png";
    let max = "https://img.example.com/max.png";
    let huge = "https://img.example.com/huge.png";
    let upstream = Arc::new(
        StubUpstream::default()
            .with(tiny, vec![1; 50], Some("image/png"))
            .with(min, vec![1; 100], Some("image/png"))
            .with(max, vec![1; MAX_IMAGE_BYTES], Some("image/png"))
            .with(huge, vec![1; 11 * 1024 * 1024], Some("image/png")),
    );
    let (app, state) = app_with(upstream, CacheLimits::default());

    assert_fallback(get(&app, &proxy_uri(tiny, false)).await).await;
    assert_fallback(get(&app, &proxy_uri(huge, false)).await).await;

    let response = get(&app, &proxy_uri(min, false)).await;
    assert_eq!(body_bytes(response).await.len(), 100);

    let response = get(&app, &proxy_uri(max, false)).await;
    assert_eq!(body_bytes(response).await.len(), MAX_IMAGE_BYTES);

    assert!(state.cache.contains(min));
    assert!(state.cache.contains(max));
    assert!(!state.cache.contains(tiny));
    assert!(!state.cache.contains(huge));
}

// == Eviction ==

#[tokio::test]
async fn test_eviction_after_201_inserts() {
    let urls: Vec<String> = (0..201)
        .map(|i| format!("https://img.example.com/{}.png", i))
        .collect();
    let upstream = urls.iter().fold(StubUpstream::default(), |stub, url| {
        stub.with(url, vec![9; 100], Some("image/png"))
    });
    let (app, state) = app_with(Arc::new(upstream), CacheLimits::default());

    for url in &urls {
        let response = get(&app, &proxy_uri(url, false)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(state.cache.len() <= 200);
    assert!(!state.cache.contains(&urls[0]));
    // ceil(201 * 0.2) = 41 oldest gone, the newest 160 stay
    for url in &urls[41..] {
        assert!(state.cache.contains(url), "{} should remain", url);
    }
}

// == TTL ==

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let upstream = Arc::new(StubUpstream::default().with(CAT, vec![0xD8; 512], Some("image/jpeg")));
    let (app, _) = app_with(
        upstream.clone(),
        CacheLimits {
            ttl: Duration::from_millis(100),
            ..CacheLimits::default()
        },
    );

    get(&app, &proxy_uri(CAT, false)).await;
    get(&app, &proxy_uri(CAT, false)).await;
    assert_eq!(upstream.calls(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;

    get(&app, &proxy_uri(CAT, false)).await;
    assert_eq!(upstream.calls(), 2);
}

// == Operational Endpoints ==

#[tokio::test]
async fn test_stats_endpoint() {
    let upstream = Arc::new(StubUpstream::default().with(CAT, vec![0xD8; 512], Some("image/jpeg")));
    let app = default_app(upstream);

    get(&app, &proxy_uri(CAT, false)).await; // miss
    get(&app, &proxy_uri(CAT, false)).await; // hit

    let response = get(&app, "/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;

    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["evictions"].as_u64().unwrap(), 0);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["total_bytes"].as_u64().unwrap(), 512);
    assert!(json.get("hit_rate").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = default_app(Arc::new(StubUpstream::default()));

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
