//! Image handling infrastructure.
//!
//! This module provides:
//! - Decoding with a fixed downsample, JPEG re-encoding, placeholder
//! - Memory caching with byte-budgeted LRU eviction
//! - Disk caching for persistence
//! - The two-tier cache and the never-failing image store

pub mod cache;
pub mod decode;
pub mod disk_cache;
pub mod memory_cache;
pub mod store;

pub use cache::ImageCache;
pub use decode::{DOWNSAMPLE_FACTOR, decode_downsampled, placeholder};
pub use disk_cache::{CACHE_DIR_NAME, DiskImageCache, cache_file_name};
pub use memory_cache::{CacheStats, MemoryImageCache};
pub use store::ImageStore;
