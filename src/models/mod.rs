//! Request and Response models for the image proxy API
//!
//! Query parameters for the proxy endpoint and JSON bodies for the
//! operational endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ImageProxyQuery;
pub use responses::{HealthResponse, StatsResponse};
