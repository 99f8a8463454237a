pub mod gallery_feed;
pub mod page_cursor;

pub use gallery_feed::{DEFAULT_MAX_CONCURRENT_RESOLVES, FeedConfig, FeedEvent, GalleryFeed};
pub use page_cursor::{FIRST_PAGE, PageCursor};
