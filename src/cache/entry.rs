//! Cache Entry Module
//!
//! Defines cached image payloads and the entries that hold them.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cached Image ==
/// A validated image body together with the content type it is served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    /// Image bytes, cheap to clone
    pub body: Bytes,
    /// Negotiated MIME type
    pub content_type: String,
}

impl CachedImage {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    /// Byte length of the image body.
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

// == Cache Entry ==
/// Represents a single cache entry with payload and insertion metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored image
    pub image: CachedImage,
    /// Insertion time
    pub inserted_at: Instant,
    /// Expiration time
    pub expires_at: Instant,
    /// Monotonic insertion counter, breaks ties between equal instants
    pub sequence: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    pub fn new(image: CachedImage, ttl: Duration, sequence: u64) -> Self {
        let now = Instant::now();
        Self {
            image,
            inserted_at: now,
            expires_at: now + ttl,
            sequence,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.image.size()
    }

    /// Sort key for oldest-first eviction.
    pub fn age_key(&self) -> (Instant, u64) {
        (self.inserted_at, self.sequence)
    }
}
