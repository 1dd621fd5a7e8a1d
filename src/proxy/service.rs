//! Image proxy service
//!
//! Validates the requested URL, answers from the cache when possible,
//! otherwise fetches, negotiates the content type, bounds the payload size,
//! caches and serves. Every failure except a missing URL comes back as an
//! error that renders as the fallback image.

use std::sync::Arc;

use axum::response::Response;
use tracing::{debug, warn};

use crate::cache::{CachedImage, ImageCache};
use crate::error::{ProxyError, Result};
use crate::proxy::fallback::image_response;
use crate::proxy::fetcher::ImageFetcher;
use crate::proxy::guard::validate_image_url;
use crate::proxy::{DEFAULT_CONTENT_TYPE, MAX_IMAGE_BYTES, MIN_IMAGE_BYTES, SUPPORTED_CONTENT_TYPES};

#[derive(Clone)]
pub struct ImageProxy {
    cache: Arc<ImageCache>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageProxy {
    pub fn new(cache: Arc<ImageCache>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Serves the image at `url`.
    ///
    /// With `skip_cache` the lookup is bypassed, but a successful fetch still
    /// refreshes the cache.
    pub async fn serve(&self, url: Option<&str>, skip_cache: bool) -> Result<Response> {
        let url = url.filter(|u| !u.is_empty()).ok_or(ProxyError::MissingUrl)?;
        validate_image_url(url)?;

        if !skip_cache {
            if let Some(cached) = self.cache.get(url) {
                debug!("Image cache hit: {}", url);
                return render(&cached);
            }
        }

        let image = self.fetch_validated(url).await?;
        let response = render(&image)?;
        self.cache.put(url, image);
        Ok(response)
    }

    /// One upstream attempt plus payload validation. Nothing is cached here.
    pub async fn fetch_validated(&self, url: &str) -> Result<CachedImage> {
        let fetched = self.fetcher.fetch(url).await?;
        check_payload_size(fetched.body.len())?;
        let content_type = negotiate_content_type(fetched.content_type.as_deref());
        Ok(CachedImage::new(fetched.body, content_type))
    }
}

fn render(image: &CachedImage) -> Result<Response> {
    image_response(image).map_err(|e| ProxyError::Internal(e.to_string()))
}

/// Picks the served MIME type from the upstream `Content-Type`.
///
/// Matching is by substring against the supported list; anything else is
/// served as `image/jpeg` without inspecting the bytes.
pub fn negotiate_content_type(upstream: Option<&str>) -> &'static str {
    let upstream = upstream.unwrap_or_default().to_ascii_lowercase();
    match SUPPORTED_CONTENT_TYPES
        .iter()
        .copied()
        .find(|mime| upstream.contains(mime))
    {
        Some(mime) => mime,
        None => {
            warn!(
                "Unsupported upstream content type {:?}, defaulting to {}",
                upstream, DEFAULT_CONTENT_TYPE
            );
            DEFAULT_CONTENT_TYPE
        }
    }
}

/// Rejects payloads strictly below the minimum or strictly above the maximum.
pub fn check_payload_size(len: usize) -> Result<()> {
    if len < MIN_IMAGE_BYTES {
        return Err(ProxyError::PayloadTooSmall(len));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(ProxyError::PayloadTooLarge(len));
    }
    Ok(())
}
