//! Cache Module
//!
//! In-memory image cache with TTL freshness and bulk oldest-first eviction.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachedImage};
pub use stats::CacheStats;
pub use store::{CacheLimits, ImageCache};

// == Public Constants ==
/// Share of entries removed by one eviction pass, in percent
pub const EVICTION_PERCENT: usize = 20;
