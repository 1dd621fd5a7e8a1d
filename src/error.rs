//! Error types for the image proxy
//!
//! Provides unified error handling using thiserror. Apart from a missing `url`
//! parameter and a broken fallback path, every error renders as the fallback
//! image so an `<img>` tag never breaks.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::proxy::fallback_response;

/// Body sent when the `url` query parameter is absent
pub const MISSING_URL_MESSAGE: &str = "Image URL is required";

/// Body sent when even the fallback image cannot be served
pub const FALLBACK_ERROR_MESSAGE: &str = "Fallback image error";

// == Proxy Error Enum ==
/// Unified error type for the image proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// `url` query parameter absent or empty
    #[error("Image URL is required")]
    MissingUrl,

    /// URL is not a well-formed absolute http(s) URL
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// URL points at a loopback/private host or a disallowed scheme
    #[error("Blocked image URL: {0}")]
    BlockedTarget(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream responded with status {0}")]
    UpstreamStatus(u16),

    /// Upstream did not answer within the fetch timeout
    #[error("Upstream request timed out")]
    Timeout,

    /// Connection or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Payload below the minimum plausible image size
    #[error("Image too small: {0} bytes")]
    PayloadTooSmall(usize),

    /// Payload above the maximum accepted image size
    #[error("Image too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// Internal failure while proxying (client setup, response building)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Returns true if this error is answered with the fallback image.
    pub fn serves_fallback(&self) -> bool {
        !matches!(self, ProxyError::MissingUrl)
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout
        } else {
            ProxyError::Network(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if !self.serves_fallback() {
            return plain_text(StatusCode::BAD_REQUEST, MISSING_URL_MESSAGE);
        }

        warn!("Serving fallback image: {}", self);
        match fallback_response() {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to build fallback response: {}", e);
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_ERROR_MESSAGE)
            }
        }
    }
}

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

// == Result Type Alias ==
/// Convenience Result type for the image proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
