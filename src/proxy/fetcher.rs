//! Upstream image fetching
//!
//! [`ImageFetcher`] is the seam between the proxy and the network. The
//! production implementation uses a shared reqwest client; tests plug in
//! stubs that count calls.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{header, redirect, Client};
use tracing::{debug, info};

use crate::error::{ProxyError, Result};
use crate::proxy::guard::is_blocked_target;
use crate::proxy::MAX_IMAGE_BYTES;

/// `Accept` header sent upstream.
pub const ACCEPT_IMAGES: &str = "image/webp,image/png,image/jpeg,image/gif,image/svg+xml,image/*;q=0.8";

const MAX_REDIRECTS: usize = 5;

/// Raw upstream response for a successful (2xx) fetch.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub body: Bytes,
    /// Upstream `Content-Type`, if any
    pub content_type: Option<String>,
}

/// Fetches remote images on behalf of the proxy.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Issues one GET for `url`. Non-2xx answers are errors.
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

// == HTTP Fetcher ==
/// reqwest-backed fetcher with timeout, identifying headers and a body cap.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    referer: String,
    max_bytes: usize,
}

impl HttpImageFetcher {
    /// Builds the shared client.
    ///
    /// Redirects are followed only towards targets that would pass the URL
    /// guard themselves.
    pub fn new(timeout: Duration, public_origin: &str) -> Result<Self> {
        let policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if is_blocked_target(attempt.url()) {
                attempt.error("redirect to blocked target")
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .timeout(timeout)
            .redirect(policy)
            .user_agent(format!("LineBuzz-ImageProxy/1.0 (+{})", public_origin))
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            referer: public_origin.to_string(),
            max_bytes: MAX_IMAGE_BYTES,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        info!("Fetching image from: {}", url);

        let mut response = self
            .client
            .get(url)
            .header(header::ACCEPT, ACCEPT_IMAGES)
            .header(header::REFERER, &self.referer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus(status.as_u16()));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes as u64 {
                return Err(ProxyError::PayloadTooLarge(declared as usize));
            }
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Stop reading as soon as the cap is crossed
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_bytes {
                return Err(ProxyError::PayloadTooLarge(body.len()));
            }
        }

        debug!("Fetched {} bytes ({:?}) from {}", body.len(), content_type, url);
        Ok(FetchedImage {
            body: body.freeze(),
            content_type,
        })
    }
}
