//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default entry cap for the image cache
pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Default aggregate byte cap for the image cache (50 MiB)
pub const DEFAULT_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Origin this service is reachable at, sent as `Referer` upstream
    pub public_origin: String,
    /// Maximum number of cached images
    pub cache_max_entries: usize,
    /// Maximum aggregate size of cached images in bytes
    pub cache_max_bytes: usize,
    /// Freshness window for cached images in seconds
    pub cache_ttl_secs: u64,
    /// Outbound fetch timeout in seconds
    pub fetch_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PUBLIC_ORIGIN` - Referer origin for upstream fetches (default: http://localhost:3000)
    /// - `CACHE_MAX_ENTRIES` - Maximum cached images (default: 200)
    /// - `CACHE_MAX_BYTES` - Maximum cached bytes (default: 52428800)
    /// - `CACHE_TTL_SECS` - Cache freshness in seconds (default: 1800)
    /// - `FETCH_TIMEOUT_SECS` - Upstream timeout in seconds (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            public_origin: env::var("PUBLIC_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.public_origin),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_max_bytes: env_or("CACHE_MAX_BYTES", defaults.cache_max_bytes),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            fetch_timeout_secs: env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            public_origin: "http://localhost:3000".to_string(),
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_max_bytes: DEFAULT_MAX_BYTES,
            cache_ttl_secs: 30 * 60,
            fetch_timeout_secs: 5,
        }
    }
}
