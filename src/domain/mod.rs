//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{DecodedImage, FeedState, ImageBytes, ImageId, Page, PageResult, ResolvedImage};
pub use errors::{CacheError, ErrorKind, FetchError, PageError};
pub use ports::{ConnectivityPort, ImageCachePort, ImageFetchPort, PhotoListPort};
