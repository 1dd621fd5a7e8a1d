//! Proxy Module
//!
//! Fetch-validate-serve pipeline behind `GET /api/proxy/image`.

mod fallback;
mod fetcher;
mod guard;
mod service;

pub use fallback::{
    fallback_response, image_response, CACHE_CONTROL_VALUE, FALLBACK_CONTENT_TYPE, FALLBACK_PNG,
};
pub use fetcher::{FetchedImage, HttpImageFetcher, ImageFetcher, ACCEPT_IMAGES};
pub use guard::{check_format, check_target, is_blocked_target, validate_image_url};
pub use service::{check_payload_size, negotiate_content_type, ImageProxy};

// == Public Constants ==
/// Smallest accepted upstream payload in bytes
pub const MIN_IMAGE_BYTES: usize = 100;

/// Largest accepted upstream payload in bytes (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Upstream content types served as-is
pub const SUPPORTED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Served when the upstream type is not in the supported list
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
