//! API Handlers
//!
//! HTTP request handlers for the image proxy and operational endpoints.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    response::Response,
    Json,
};

use crate::cache::ImageCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, ImageProxyQuery, StatsResponse};
use crate::proxy::{HttpImageFetcher, ImageFetcher, ImageProxy};

/// Application state shared across all handlers.
///
/// Holds the image proxy and a handle on the cache it fills.
#[derive(Clone)]
pub struct AppState {
    /// Shared image cache
    pub cache: Arc<ImageCache>,
    /// Fetch-validate-serve pipeline
    pub proxy: ImageProxy,
}

impl AppState {
    /// Creates a new AppState from a cache and the fetcher that feeds it.
    pub fn new(cache: ImageCache, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let cache = Arc::new(cache);
        Self {
            proxy: ImageProxy::new(cache.clone(), fetcher),
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the bounded cache and the reqwest-backed fetcher.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpImageFetcher::new(
            std::time::Duration::from_secs(config.fetch_timeout_secs),
            &config.public_origin,
        )?;
        Ok(Self::new(ImageCache::from_config(config), Arc::new(fetcher)))
    }
}

/// Handler for GET /api/proxy/image
///
/// Returns the proxied image, the fallback image, or `400` without `url`.
/// The query string is parsed leniently so that repeated parameters never
/// turn into an extractor rejection.
pub async fn proxy_image_handler(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response> {
    let query = ImageProxyQuery::from_query_string(raw.as_deref());
    state
        .proxy
        .serve(query.url.as_deref(), query.skip_cache())
        .await
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
