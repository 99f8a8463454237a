//! Two-tier image cache: bounded memory in front of unbounded disk.

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use super::decode;
use super::disk_cache::DiskImageCache;
use super::memory_cache::{CacheStats, MemoryImageCache};
use crate::domain::entities::{DecodedImage, ImageBytes, ImageId, ImageSource, ResolvedImage};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::ImageCachePort;

/// Memory tier backed by a disk tier, keyed by image identifier.
pub struct ImageCache {
    memory: MemoryImageCache,
    disk: DiskImageCache,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("budget_bytes", &self.memory.budget_bytes())
            .field("disk_dir", &self.disk.cache_dir())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Combines the two tiers.
    #[must_use]
    pub const fn new(memory: MemoryImageCache, disk: DiskImageCache) -> Self {
        Self { memory, disk }
    }

    /// The memory tier.
    #[must_use]
    pub const fn memory(&self) -> &MemoryImageCache {
        &self.memory
    }

    /// The disk tier.
    #[must_use]
    pub const fn disk(&self) -> &DiskImageCache {
        &self.disk
    }

    /// Returns memory cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.memory.stats().await
    }

    /// Drops the memory tier only.
    pub async fn clear_memory(&self) {
        self.memory.clear().await;
    }

    /// Clears both tiers.
    ///
    /// # Errors
    /// Returns error if the disk directory cannot be read.
    pub async fn clear(&self) -> CacheResult<()> {
        self.memory.clear().await;
        self.disk.clear().await
    }
}

#[async_trait]
impl ImageCachePort for ImageCache {
    async fn get(&self, id: &ImageId) -> Option<ResolvedImage> {
        if let Some(img) = self.memory.get(id).await {
            return Some(ResolvedImage::new(id.clone(), img, ImageSource::MemoryCache));
        }

        let img = self.disk.get(id).await?;
        let evicted = self.memory.put(id.clone(), img.clone()).await;
        trace!(id = %id, evicted = evicted.len(), "Promoted disk hit into memory");
        Some(ResolvedImage::new(id.clone(), img, ImageSource::DiskCache))
    }

    async fn put(&self, id: &ImageId, bytes: &ImageBytes) -> CacheResult<DecodedImage> {
        let img = decode::decode_blocking(bytes.data().clone(), true)
            .await
            .map_err(|e| CacheError::DecodeError(e.to_string()))?;

        // A failed disk write still leaves the image usable for this session.
        if let Err(e) = self.disk.put_image(id, &img).await {
            warn!(id = %id, error = %e, "Failed to cache to disk");
        }

        let evicted = self.memory.put(id.clone(), img.clone()).await;
        debug!(
            id = %id,
            width = img.width(),
            height = img.height(),
            evicted = evicted.len(),
            "Cached image"
        );
        Ok(img)
    }
}
