//! Decoding, downsampling and re-encoding of image payloads.

use std::io::Cursor;
use std::sync::LazyLock;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

use crate::domain::entities::DecodedImage;
use crate::domain::errors::{CacheError, CacheResult, FetchError};

/// Linear downsample factor applied while decoding network payloads.
pub const DOWNSAMPLE_FACTOR: u32 = 2;

/// JPEG quality used for the disk tier.
pub const JPEG_QUALITY: u8 = 100;

/// Edge length of the placeholder image.
pub const PLACEHOLDER_SIZE: u32 = 64;

static PLACEHOLDER: LazyLock<DecodedImage> = LazyLock::new(|| {
    DecodedImage::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        Rgb([128, 128, 128]),
    )))
});

/// Returns the fixed fallback image.
#[must_use]
pub fn placeholder() -> DecodedImage {
    PLACEHOLDER.clone()
}

/// Decodes a network payload and halves each dimension.
///
/// # Errors
/// Returns `FetchError::Decode` if the bytes are not a supported image.
pub fn decode_downsampled(bytes: &[u8]) -> Result<DecodedImage, FetchError> {
    let img = image::load_from_memory(bytes).map_err(|e| FetchError::decode(e.to_string()))?;
    Ok(DecodedImage::new(downsample(img, DOWNSAMPLE_FACTOR)))
}

/// Decodes bytes as stored, without resampling.
///
/// # Errors
/// Returns `FetchError::Decode` if the bytes are not a supported image.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, FetchError> {
    image::load_from_memory(bytes)
        .map(DecodedImage::new)
        .map_err(|e| FetchError::decode(e.to_string()))
}

/// Runs a decode on the blocking pool.
///
/// # Errors
/// Returns `FetchError::Decode` on invalid data or if the task panicked.
pub async fn decode_blocking(bytes: Bytes, downsampled: bool) -> Result<DecodedImage, FetchError> {
    tokio::task::spawn_blocking(move || {
        if downsampled {
            decode_downsampled(&bytes)
        } else {
            decode(&bytes)
        }
    })
    .await
    .map_err(|e| FetchError::decode(format!("decode task panicked: {e}")))?
}

/// Encodes an image as JPEG. Alpha is dropped.
///
/// # Errors
/// Returns `CacheError::EncodeError` if encoding fails.
pub fn encode_jpeg(image: &DecodedImage) -> CacheResult<Vec<u8>> {
    let rgb = image.image().to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CacheError::EncodeError(e.to_string()))?;
    Ok(buf)
}

fn downsample(img: DynamicImage, factor: u32) -> DynamicImage {
    let width = (img.width() / factor).max(1);
    let height = (img.height() / factor).max(1);
    if width == img.width() && height == img.height() {
        return img;
    }
    img.resize_exact(width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::png_bytes;

    #[test]
    fn test_decode_halves_dimensions() {
        let bytes = png_bytes(40, 30);
        let img = decode_downsampled(bytes.data()).unwrap();
        assert_eq!((img.width(), img.height()), (20, 15));
    }

    #[test]
    fn test_decode_keeps_single_pixel() {
        let bytes = png_bytes(1, 1);
        let img = decode_downsampled(bytes.data()).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_downsampled(b"<html>not an image</html>");
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_jpeg_round_trip_keeps_size() {
        let img = decode(png_bytes(12, 8).data()).unwrap();
        let jpeg = encode_jpeg(&img).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let back = decode(&jpeg).unwrap();
        assert_eq!((back.width(), back.height()), (12, 8));
    }

    #[test]
    fn test_placeholder_is_shared() {
        assert!(placeholder().ptr_eq(&placeholder()));
        assert_eq!(placeholder().width(), PLACEHOLDER_SIZE);
    }
}
