//! Image responses
//!
//! Builds the success and fallback responses. Both carry the same caching
//! and CORS headers so browsers treat them alike.

use std::sync::LazyLock;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;

use crate::cache::CachedImage;

pub const CACHE_CONTROL_VALUE: &str = "public, max-age=86400";

pub const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// 1x1 fully transparent PNG (grayscale + alpha).
static TRANSPARENT_PIXEL_PNG: [u8; 68] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, //
    0x08, 0x04, 0x00, 0x00, 0x00, 0xB5, 0x1C, 0x0C, //
    0x02, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, // IDAT
    0x54, 0x78, 0xDA, 0x63, 0x64, 0x60, 0x00, 0x00, //
    0x00, 0x06, 0x00, 0x02, 0x30, 0x81, 0xD0, 0x2F, //
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND
    0xAE, 0x42, 0x60, 0x82,
];

/// Process-wide fallback image buffer, shared by every fallback response.
pub static FALLBACK_PNG: LazyLock<Bytes> =
    LazyLock::new(|| Bytes::from_static(&TRANSPARENT_PIXEL_PNG));

/// Builds a `200` response for `image` with caching and CORS headers.
pub fn image_response(image: &CachedImage) -> Result<Response, axum::http::Error> {
    build(image.body.clone(), &image.content_type)
}

/// Builds the `200 image/png` fallback response.
pub fn fallback_response() -> Result<Response, axum::http::Error> {
    build(FALLBACK_PNG.clone(), FALLBACK_CONTENT_TYPE)
}

fn build(body: Bytes, content_type: &str) -> Result<Response, axum::http::Error> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from(body))
}
