//! In-memory LRU image cache bounded by resident bytes.

use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::{DecodedImage, ImageId};

/// Fallback budget when none is configured (64 MiB).
pub const DEFAULT_BUDGET_BYTES: usize = 64 * 1024 * 1024;

struct MemoryTier {
    entries: LruCache<ImageId, DecodedImage>,
    resident_bytes: usize,
}

/// In-memory LRU cache for decoded images.
///
/// Entries are weighed by their pixel buffer size. Inserting past the budget
/// evicts least-recently-used entries one at a time until the resident size
/// fits again. Reads promote, so the budget and the LRU order are only ever
/// touched under the write lock.
pub struct MemoryImageCache {
    tier: RwLock<MemoryTier>,
    budget_bytes: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache holding at most `budget_bytes` of pixels.
    #[must_use]
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            tier: RwLock::new(MemoryTier {
                entries: LruCache::unbounded(),
                resident_bytes: 0,
            }),
            budget_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Configured byte budget.
    #[must_use]
    pub const fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Gets an image and marks it most recently used.
    pub async fn get(&self, id: &ImageId) -> Option<DecodedImage> {
        let mut tier = self.tier.write().await;
        if let Some(img) = tier.entries.get(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache miss");
            None
        }
    }

    /// Peeks at an image without promoting it in the LRU.
    pub async fn peek(&self, id: &ImageId) -> Option<DecodedImage> {
        let tier = self.tier.read().await;
        tier.entries.peek(id).cloned()
    }

    /// Stores an image, then evicts LRU entries until under budget.
    /// Returns the identifiers evicted by this insertion.
    ///
    /// An image larger than the whole budget is not stored and evicts
    /// nothing.
    pub async fn put(&self, id: ImageId, image: DecodedImage) -> Vec<ImageId> {
        let size = image.byte_size();
        if size > self.budget_bytes {
            debug!(id = %id, size, budget = self.budget_bytes, "Image exceeds memory budget, not cached");
            return Vec::new();
        }

        let mut tier = self.tier.write().await;
        if let Some(previous) = tier.entries.put(id.clone(), image) {
            tier.resident_bytes -= previous.byte_size();
        }
        tier.resident_bytes += size;
        trace!(id = %id, size, resident = tier.resident_bytes, "Stored image in memory cache");

        let mut evicted = Vec::new();
        while tier.resident_bytes > self.budget_bytes {
            let Some((old_id, old_img)) = tier.entries.pop_lru() else {
                break;
            };
            tier.resident_bytes -= old_img.byte_size();
            debug!(id = %old_id, freed = old_img.byte_size(), "Evicted image from memory cache");
            evicted.push(old_id);
        }

        evicted
    }

    /// Removes an image from the cache.
    pub async fn evict(&self, id: &ImageId) {
        let mut tier = self.tier.write().await;
        if let Some(img) = tier.entries.pop(id) {
            tier.resident_bytes -= img.byte_size();
            debug!(id = %id, "Evicted image from memory cache");
        }
    }

    /// Returns true if `id` is resident. Does not promote.
    pub async fn contains(&self, id: &ImageId) -> bool {
        self.tier.read().await.entries.contains(id)
    }

    /// Bytes currently held.
    pub async fn resident_bytes(&self) -> usize {
        self.tier.read().await.resident_bytes
    }

    /// Number of resident images.
    pub async fn len(&self) -> usize {
        self.tier.read().await.entries.len()
    }

    /// Returns true if nothing is resident.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut tier = self.tier.write().await;
        tier.entries.clear();
        tier.resident_bytes = 0;
        debug!("Cleared memory image cache");
    }

    /// Returns cache statistics.
    #[allow(clippy::cast_precision_loss)]
    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let tier = self.tier.read().await;
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: tier.entries.len(),
            resident_bytes: tier.resident_bytes,
            budget_bytes: self.budget_bytes,
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET_BYTES)
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Bytes of pixel data held.
    pub resident_bytes: usize,
    /// Configured byte budget.
    pub budget_bytes: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images ({} / {} bytes), {:.1}% hit rate ({} hits, {} misses)",
            self.size,
            self.resident_bytes,
            self.budget_bytes,
            self.hit_rate,
            self.hits,
            self.misses
        )
    }
}
