//! Buzz Image Proxy - image fetch-and-cache endpoint
//!
//! Proxies remote images for `<img>` tags, caching validated responses in a
//! bounded in-memory cache and falling back to a transparent pixel on failure.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;

pub use api::AppState;
pub use config::Config;
pub use error::{ProxyError, Result};
