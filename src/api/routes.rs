//! API Routes
//!
//! Configures the Axum router with all image proxy endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, proxy_image_handler, stats_handler, AppState};

/// Path of the image proxy endpoint
pub const PROXY_IMAGE_PATH: &str = "/api/proxy/image";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/proxy/image` - Proxy a remote image
/// - `GET /stats` - Get image cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(PROXY_IMAGE_PATH, get(proxy_image_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
