//! API Module
//!
//! HTTP handlers and routing for the image proxy.
//!
//! # Endpoints
//! - `GET /api/proxy/image?url=..&skip_cache=true` - Proxy a remote image
//! - `GET /stats` - Get image cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, PROXY_IMAGE_PATH};
