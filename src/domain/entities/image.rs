//! Domain types for image handling.

use std::sync::Arc;

use bytes::Bytes;

/// Identifier of a photo: the URL it is served from.
/// Used as the cache key and as the feed de-duplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Encoded image payload as received from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    data: Bytes,
    content_type: String,
}

impl ImageBytes {
    /// Wraps a payload and its declared content type.
    #[must_use]
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    /// Raw encoded bytes.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Declared `Content-Type` of the payload.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decoded pixel buffer, shared read-only between the cache and the display.
#[derive(Clone)]
pub struct DecodedImage(Arc<image::DynamicImage>);

impl DecodedImage {
    /// Wraps a decoded image.
    #[must_use]
    pub fn new(image: image::DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn image(&self) -> &image::DynamicImage {
        &self.0
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Resident size of the pixel buffer in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.0.as_bytes().len()
    }

    /// Returns true if both handles point at the same buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for DecodedImage {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.width() == other.width()
                && self.height() == other.height()
                && self.0.color() == other.0.color()
                && self.0.as_bytes() == other.0.as_bytes())
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.byte_size())
            .finish()
    }
}

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the in-memory LRU tier.
    MemoryCache,
    /// Decoded from the on-disk tier.
    DiskCache,
    /// Downloaded from the network.
    Network,
    /// Every path failed; the fixed fallback image was used.
    Placeholder,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// An image ready for display.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// The image ID.
    pub id: ImageId,
    /// The decoded image data.
    pub image: DecodedImage,
    /// Where the image was loaded from.
    pub source: ImageSource,
}

impl ResolvedImage {
    /// Creates a resolved image.
    #[must_use]
    pub const fn new(id: ImageId, image: DecodedImage, source: ImageSource) -> Self {
        Self { id, image, source }
    }

    /// Returns true if this is the fallback image.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.source == ImageSource::Placeholder
    }
}
