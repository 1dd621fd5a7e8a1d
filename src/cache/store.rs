//! Image Cache Module
//!
//! Count- and byte-bounded image cache with TTL freshness and bulk
//! oldest-first eviction. All state lives behind one mutex so lookups, inserts
//! and the eviction pass are atomic with respect to each other.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, CachedImage, EVICTION_PERCENT};
use crate::config::{Config, DEFAULT_MAX_BYTES, DEFAULT_MAX_ENTRIES};

// == Cache Limits ==
/// Capacity and freshness bounds for an [`ImageCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Maximum aggregate payload size in bytes
    pub max_bytes: usize,
    /// Freshness window of an entry
    pub ttl: Duration,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: DEFAULT_MAX_BYTES,
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_entries: config.cache_max_entries,
            max_bytes: config.cache_max_bytes,
            ttl: Duration::from_secs(config.cache_ttl_secs),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    total_bytes: usize,
    next_sequence: u64,
    stats: CacheStats,
}

impl CacheState {
    fn is_over(&self, limits: &CacheLimits) -> bool {
        self.entries.len() > limits.max_entries || self.total_bytes > limits.max_bytes
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_bytes -= entry.size();
        Some(entry)
    }

    /// Evicts the oldest `EVICTION_PERCENT` of entries when a cap is exceeded,
    /// then keeps going oldest-first until both caps hold.
    fn evict_over_capacity(&mut self, limits: &CacheLimits) -> usize {
        if !self.is_over(limits) {
            return 0;
        }

        let count = self.entries.len();
        let batch = (count * EVICTION_PERCENT).div_ceil(100);

        let mut by_age: Vec<_> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.age_key(), key.clone()))
            .collect();
        by_age.sort_unstable();

        let mut evicted = 0;
        for (_, key) in by_age {
            if evicted >= batch && !self.is_over(limits) {
                break;
            }
            self.remove(&key);
            evicted += 1;
        }

        self.stats.record_evictions(evicted);
        evicted
    }
}

// == Image Cache ==
/// Thread-safe in-memory cache of proxied images keyed by source URL.
#[derive(Debug)]
pub struct ImageCache {
    state: Mutex<CacheState>,
    limits: CacheLimits,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(CacheLimits::default())
    }
}

impl ImageCache {
    // == Constructor ==
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            limits,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheLimits::from_config(config))
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    // == Get ==
    /// Returns a clone of the fresh entry for `url`.
    ///
    /// Expired entries count as misses but stay in place until they are
    /// overwritten or evicted.
    pub fn get(&self, url: &str) -> Option<CachedImage> {
        let mut state = self.state.lock();
        let fresh = state
            .entries
            .get(url)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.image.clone());

        match fresh {
            Some(image) => {
                state.stats.record_hit();
                Some(image)
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores `image` under `url`, replacing any previous entry, then runs the
    /// eviction pass under the same lock.
    ///
    /// Returns the number of entries evicted.
    pub fn put(&self, url: impl Into<String>, image: CachedImage) -> usize {
        let url = url.into();
        let mut state = self.state.lock();

        state.remove(&url);
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.total_bytes += image.size();
        state
            .entries
            .insert(url, CacheEntry::new(image, self.limits.ttl, sequence));

        let evicted = state.evict_over_capacity(&self.limits);
        if evicted > 0 {
            info!(
                "Image cache over capacity: evicted {} entries ({} remaining, {} bytes)",
                evicted,
                state.entries.len(),
                state.total_bytes
            );
        } else {
            debug!(
                "Image cache holds {} entries ({} bytes)",
                state.entries.len(),
                state.total_bytes
            );
        }
        evicted
    }

    // == Evict If Over Capacity ==
    /// Runs the eviction pass on demand. Returns the number of entries evicted.
    pub fn evict_if_over_capacity(&self) -> usize {
        self.state.lock().evict_over_capacity(&self.limits)
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_footprint(state.entries.len(), state.total_bytes);
        stats
    }

    /// Checks presence without touching statistics or freshness.
    pub fn contains(&self, url: &str) -> bool {
        self.state.lock().entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.state.lock().total_bytes
    }
}
