//! Application layer: page cursor and feed loader.

/// Feed services.
pub mod services;

pub use services::{FeedConfig, FeedEvent, GalleryFeed, PageCursor};
