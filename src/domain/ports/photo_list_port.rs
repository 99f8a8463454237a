//! Port for the paginated photo list endpoint.

use async_trait::async_trait;

use crate::domain::entities::ImageId;
use crate::domain::errors::PageError;

/// Source of photo identifiers, one page at a time.
#[async_trait]
pub trait PhotoListPort: Send + Sync {
    /// Fetches and parses page `page` (1-based). An empty list means the
    /// source has no more results.
    async fn fetch_page(&self, page: u32) -> Result<Vec<ImageId>, PageError>;
}
