//! Domain entity definitions.

mod feed;
mod image;
mod page;

pub use feed::{FeedState, FeedStatus};
pub use self::image::{DecodedImage, ImageBytes, ImageId, ImageSource, ResolvedImage};
pub use page::{Page, PageResult};
