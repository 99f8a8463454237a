//! Port definition for image caching.

use crate::domain::entities::{DecodedImage, ImageBytes, ImageId, ResolvedImage};
use crate::domain::errors::CacheResult;

/// Port for image caching operations.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Attempts to get an image from the cache.
    /// The returned source names the tier that answered. Returns None on a
    /// miss in every tier.
    async fn get(&self, id: &ImageId) -> Option<ResolvedImage>;

    /// Decodes `bytes`, persists and stores the result, and returns it.
    async fn put(&self, id: &ImageId, bytes: &ImageBytes) -> CacheResult<DecodedImage>;
}
