//! Disk-based image cache for persistence across sessions.
//!
//! Files live in `<root>/imageCache/` and are named after the decimal form
//! of a 64-bit hash of the source URL. Every file is a JPEG re-encoded from
//! an image that already decoded successfully. There is no eviction: the
//! directory grows until something outside the process clears it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, trace, warn};

use super::decode;
use crate::domain::entities::{DecodedImage, ImageId};
use crate::domain::errors::{CacheError, CacheResult};

/// Name of the cache directory under the cache root.
pub const CACHE_DIR_NAME: &str = "imageCache";

/// Maps an identifier to its cache file name.
///
/// Distinct URLs can collide on the 64-bit hash; a collision serves the
/// other URL's image.
#[must_use]
pub fn cache_file_name(id: &ImageId) -> String {
    let digest = Sha256::digest(id.as_str().as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix).to_string()
}

fn is_cache_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.parse::<u64>().is_ok())
}

/// Bytes and file count of the cache directory.
///
/// Held locked across the stat and the rename or unlink it accounts for,
/// so concurrent writers of one file agree on whether it already existed.
#[derive(Debug, Default)]
struct DiskUsage {
    bytes: u64,
    files: usize,
}

impl DiskUsage {
    fn record_write(&mut self, previous: Option<u64>, size: u64) {
        match previous {
            Some(old) => self.bytes = self.bytes.saturating_sub(old).saturating_add(size),
            None => {
                self.bytes = self.bytes.saturating_add(size);
                self.files += 1;
            }
        }
    }

    fn record_removal(&mut self, size: u64) {
        self.bytes = self.bytes.saturating_sub(size);
        self.files = self.files.saturating_sub(1);
    }
}

/// Disk-based image cache that persists JPEG files.
pub struct DiskImageCache {
    cache_dir: PathBuf,
    usage: Arc<Mutex<DiskUsage>>,
}

impl DiskImageCache {
    /// Opens (creating if needed) the cache under `cache_root`.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created or read.
    pub async fn new(cache_root: impl AsRef<Path>) -> CacheResult<Self> {
        let cache_dir = cache_root.as_ref().join(CACHE_DIR_NAME);
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to create cache dir: {e}")))?;

        let mut total_size = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read cache dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            if !is_cache_file(&entry.path()) {
                continue;
            }
            if let Ok(meta) = entry.metadata().await {
                total_size += meta.len();
                count += 1;
            }
        }

        debug!(
            path = %cache_dir.display(),
            files = count,
            bytes = total_size,
            "Opened disk image cache"
        );

        Ok(Self {
            cache_dir,
            usage: Arc::new(Mutex::new(DiskUsage {
                bytes: total_size,
                files: count,
            })),
        })
    }

    /// Directory holding the cache files.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path for a cached image.
    #[must_use]
    pub fn cache_path(&self, id: &ImageId) -> PathBuf {
        self.cache_dir.join(cache_file_name(id))
    }

    /// Gets the stored JPEG bytes.
    pub async fn get_bytes(&self, id: &ImageId) -> Option<Vec<u8>> {
        let path = self.cache_path(id);
        if let Ok(bytes) = fs::read(&path).await {
            trace!(id = %id, path = %path.display(), "Disk cache hit");
            Some(bytes)
        } else {
            trace!(id = %id, "Disk cache miss");
            None
        }
    }

    /// Loads and decodes an image from disk cache.
    /// A file that no longer decodes is removed and reported as a miss.
    pub async fn get(&self, id: &ImageId) -> Option<DecodedImage> {
        let bytes = self.get_bytes(id).await?;

        match decode::decode_blocking(bytes.into(), false).await {
            Ok(img) => {
                debug!(id = %id, "Decoded image from disk cache");
                Some(img)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to decode cached image, removing it");
                self.evict(id).await;
                None
            }
        }
    }

    /// Encodes `image` as JPEG and stores it, replacing any previous file.
    ///
    /// The file is written to a temporary name and renamed into place, so
    /// concurrent writers for the same identifier never leave a torn file.
    ///
    /// # Errors
    /// Returns error if encoding or any file operation fails.
    pub async fn put_image(&self, id: &ImageId, image: &DecodedImage) -> CacheResult<()> {
        let path = self.cache_path(id);
        let dir = self.cache_dir.clone();
        let image = image.clone();
        let target = path.clone();

        let usage = Arc::clone(&self.usage);

        let new_size = tokio::task::spawn_blocking(move || -> CacheResult<u64> {
            let jpeg = decode::encode_jpeg(&image)?;
            let io = |e: std::io::Error| CacheError::IoError(format!("Failed to write cache file: {e}"));

            let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(io)?;
            temp.write_all(&jpeg).map_err(io)?;
            temp.as_file().sync_all().map_err(io)?;

            let size = jpeg.len() as u64;
            let mut usage = usage.lock();
            let previous = std::fs::metadata(&target).map(|m| m.len()).ok();
            temp.persist(&target).map_err(|e| io(e.error))?;
            usage.record_write(previous, size);
            Ok(size)
        })
        .await
        .map_err(|e| CacheError::IoError(format!("Cache write task panicked: {e}")))??;

        debug!(id = %id, path = %path.display(), size = new_size, "Stored image in disk cache");
        Ok(())
    }

    /// Removes an image from disk cache.
    pub async fn evict(&self, id: &ImageId) {
        let path = self.cache_path(id);
        let usage = Arc::clone(&self.usage);

        let removed = tokio::task::spawn_blocking(move || -> std::io::Result<bool> {
            let mut usage = usage.lock();
            let Ok(meta) = std::fs::metadata(&path) else {
                return Ok(false);
            };
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    usage.record_removal(meta.len());
                    Ok(true)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await;

        match removed {
            Ok(Ok(true)) => debug!(id = %id, "Evicted from disk cache"),
            Ok(Ok(false)) => trace!(id = %id, "Nothing to evict from disk cache"),
            Ok(Err(e)) => warn!(id = %id, error = %e, "Failed to evict from disk cache"),
            Err(e) => warn!(id = %id, error = %e, "Evict task panicked"),
        }
    }

    /// Clears the entire disk cache.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be read.
    pub async fn clear(&self) -> CacheResult<()> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read cache dir: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to read entry: {e}")))?
        {
            let path = entry.path();
            if is_cache_file(&path) && fs::remove_file(&path).await.is_err() {
                warn!(path = %path.display(), "Failed to remove cache file");
            }
        }
        *self.usage.lock() = DiskUsage::default();
        debug!("Cleared disk cache");
        Ok(())
    }

    /// Returns the current cache size in bytes.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.usage.lock().bytes
    }

    /// Returns the number of cached files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.usage.lock().files
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if an image is cached.
    pub async fn contains(&self, id: &ImageId) -> bool {
        let path = self.cache_path(id);
        fs::try_exists(&path).await.unwrap_or(false)
    }
}
