//! Image resolution orchestrator.
//!
//! Implements the fallback chain: Memory -> Disk -> Network -> Placeholder

use std::sync::Arc;

use tracing::{debug, warn};

use super::decode;
use crate::domain::entities::{DecodedImage, ImageId, ImageSource, ResolvedImage};
use crate::domain::ports::{ImageCachePort, ImageFetchPort};

/// Answers "give me the image for this identifier" and never fails.
pub struct ImageStore {
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetchPort>,
    placeholder: DecodedImage,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore").finish_non_exhaustive()
    }
}

impl ImageStore {
    /// Creates a store using the default placeholder.
    #[must_use]
    pub fn new(cache: Arc<dyn ImageCachePort>, fetcher: Arc<dyn ImageFetchPort>) -> Self {
        Self::with_placeholder(cache, fetcher, decode::placeholder())
    }

    /// Creates a store with a custom fallback image.
    #[must_use]
    pub fn with_placeholder(
        cache: Arc<dyn ImageCachePort>,
        fetcher: Arc<dyn ImageFetchPort>,
        placeholder: DecodedImage,
    ) -> Self {
        Self {
            cache,
            fetcher,
            placeholder,
        }
    }

    /// The image returned when every path fails.
    #[must_use]
    pub const fn placeholder(&self) -> &DecodedImage {
        &self.placeholder
    }

    /// Resolves an image from cache, then network, then the placeholder.
    pub async fn resolve(&self, id: &ImageId) -> ResolvedImage {
        if let Some(hit) = self.cache.get(id).await {
            return hit;
        }

        debug!(id = %id, "Downloading image from network");

        let bytes = match self.fetcher.fetch(id.as_str()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(id = %id, error = %e, kind = %e.kind(), "Image fetch failed, using placeholder");
                return self.fallback(id);
            }
        };

        match self.cache.put(id, &bytes).await {
            Ok(image) => {
                debug!(id = %id, source = "network", "Image loaded successfully");
                ResolvedImage::new(id.clone(), image, ImageSource::Network)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Downloaded image unusable, using placeholder");
                self.fallback(id)
            }
        }
    }

    fn fallback(&self, id: &ImageId) -> ResolvedImage {
        ResolvedImage::new(id.clone(), self.placeholder.clone(), ImageSource::Placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ImageBytes;
    use crate::domain::errors::FetchError;
    use crate::domain::ports::mocks::MockImageFetch;
    use crate::infrastructure::image::{DiskImageCache, ImageCache, MemoryImageCache};
    use tempfile::TempDir;
    use test_case::test_case;

    async fn create_store(fetcher: Arc<MockImageFetch>, root: &TempDir) -> ImageStore {
        let disk = DiskImageCache::new(root.path()).await.unwrap();
        let cache = Arc::new(ImageCache::new(MemoryImageCache::new(1024 * 1024), disk));
        ImageStore::new(cache, fetcher)
    }

    #[tokio::test]
    async fn test_network_then_memory() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(MockImageFetch::new());
        fetcher.with_image("https://example.com/a.png", 40, 40);
        let store = create_store(fetcher.clone(), &temp).await;
        let id = ImageId::new("https://example.com/a.png");

        let first = store.resolve(&id).await;
        let second = store.resolve(&id).await;

        assert_eq!(first.source, ImageSource::Network);
        assert_eq!(first.image.width(), 20);
        assert_eq!(second.source, ImageSource::MemoryCache);
        assert_eq!(fetcher.calls_for(id.as_str()), 1);
    }

    #[tokio::test]
    async fn test_disk_entry_avoids_network() {
        let temp = TempDir::new().unwrap();
        let id = ImageId::new("https://example.com/a.png");

        let warm = Arc::new(MockImageFetch::new());
        warm.with_image(id.as_str(), 40, 40);
        create_store(warm, &temp).await.resolve(&id).await;

        let cold = Arc::new(MockImageFetch::new());
        let store = create_store(cold.clone(), &temp).await;
        let resolved = store.resolve(&id).await;

        assert_eq!(resolved.source, ImageSource::DiskCache);
        assert_eq!(cold.total_calls(), 0);
    }

    #[test_case(Err(FetchError::not_an_image("text/html")) ; "not_an_image")]
    #[test_case(Err(FetchError::Forbidden) ; "forbidden")]
    #[test_case(Err(FetchError::HttpError { code: 500 }) ; "http_error")]
    #[test_case(Err(FetchError::host_unreachable("example.com")) ; "host_unreachable")]
    #[test_case(Ok(ImageBytes::new(&b"garbage"[..], "image/jpeg")) ; "undecodable")]
    #[tokio::test]
    async fn test_failures_resolve_to_placeholder(response: Result<ImageBytes, FetchError>) {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(MockImageFetch::new());
        fetcher.set_response("https://example.com/x", response);
        let store = create_store(fetcher, &temp).await;

        let resolved = store.resolve(&ImageId::new("https://example.com/x")).await;

        assert!(resolved.is_placeholder());
        assert!(resolved.image.ptr_eq(store.placeholder()));
    }

    #[tokio::test]
    async fn test_placeholder_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let fetcher = Arc::new(MockImageFetch::new());
        let store = create_store(fetcher.clone(), &temp).await;
        let id = ImageId::new("https://example.com/later.png");

        assert!(store.resolve(&id).await.is_placeholder());

        fetcher.with_image(id.as_str(), 10, 10);
        let resolved = store.resolve(&id).await;
        assert_eq!(resolved.source, ImageSource::Network);
        assert_eq!(fetcher.calls_for(id.as_str()), 2);
    }
}
