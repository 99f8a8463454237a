//! Port for downloading individual images.

use async_trait::async_trait;

use crate::domain::entities::ImageBytes;
use crate::domain::errors::FetchError;

/// Downloads one image resource. No caching, no retry.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Fetches the encoded bytes behind `url`.
    async fn fetch(&self, url: &str) -> Result<ImageBytes, FetchError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    /// Encodes a blank PNG of the given size.
    pub fn png_bytes(width: u32, height: u32) -> ImageBytes {
        let mut buf = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode png");
        ImageBytes::new(buf, "image/png")
    }

    /// Mock image fetcher with scripted responses per URL.
    #[derive(Default)]
    pub struct MockImageFetch {
        responses: Mutex<HashMap<String, Result<ImageBytes, FetchError>>>,
        delays: Mutex<HashMap<String, Duration>>,
        calls: Mutex<Vec<String>>,
        total: AtomicUsize,
    }

    impl MockImageFetch {
        /// Creates new mock that fails every URL with HTTP 404.
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves a PNG of the given size for `url`.
        pub fn with_image(&self, url: &str, width: u32, height: u32) {
            self.responses
                .lock()
                .insert(url.to_string(), Ok(png_bytes(width, height)));
        }

        /// Scripts a response for `url`.
        pub fn set_response(&self, url: &str, response: Result<ImageBytes, FetchError>) {
            self.responses.lock().insert(url.to_string(), response);
        }

        /// Delays the response for `url`.
        pub fn set_delay(&self, url: &str, delay: Duration) {
            self.delays.lock().insert(url.to_string(), delay);
        }

        /// Number of fetches issued for `url`.
        pub fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().iter().filter(|u| *u == url).count()
        }

        /// Total number of fetches issued.
        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageFetchPort for MockImageFetch {
        async fn fetch(&self, url: &str) -> Result<ImageBytes, FetchError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().push(url.to_string());

            let delay = self.delays.lock().get(url).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.responses
                .lock()
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::HttpError { code: 404 }))
        }
    }
}
