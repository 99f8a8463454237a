//! Page-by-page cursor over the photo list.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{Page, PageResult};
use crate::domain::errors::PageError;
use crate::domain::ports::{ConnectivityPort, PhotoListPort};

/// First page number the list endpoint accepts.
pub const FIRST_PAGE: u32 = 1;

/// Tracks the next page to request and advances only on success.
pub struct PageCursor {
    source: Arc<dyn PhotoListPort>,
    connectivity: Arc<dyn ConnectivityPort>,
    next_page: u32,
    exhausted: bool,
}

impl std::fmt::Debug for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCursor")
            .field("next_page", &self.next_page)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl PageCursor {
    /// Creates a cursor positioned at the first page.
    #[must_use]
    pub fn new(source: Arc<dyn PhotoListPort>, connectivity: Arc<dyn ConnectivityPort>) -> Self {
        Self {
            source,
            connectivity,
            next_page: FIRST_PAGE,
            exhausted: false,
        }
    }

    /// Page number the next call to [`load_next`](Self::load_next) requests.
    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Returns true once the source has reported an empty page.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Rewinds to the first page.
    pub fn reset(&mut self) {
        debug!("Resetting page cursor");
        self.next_page = FIRST_PAGE;
        self.exhausted = false;
    }

    /// Requests the current page.
    ///
    /// On success the cursor moves to the following page. On failure it
    /// stays put, so the next call retries the same page. No request is
    /// made while offline.
    pub async fn load_next(&mut self) -> PageResult {
        if self.exhausted {
            return PageResult::Exhausted;
        }

        let page = self.next_page;

        if !self.connectivity.is_connected().await {
            warn!(page, "No connectivity, skipping page request");
            return PageResult::Failure(PageError::NoConnectivity);
        }

        debug!(page, "Requesting page");

        match self.source.fetch_page(page).await {
            Ok(ids) if ids.is_empty() => {
                info!(page, "Photo list exhausted");
                self.exhausted = true;
                PageResult::Exhausted
            }
            Ok(ids) => {
                debug!(page, count = ids.len(), "Page loaded");
                self.next_page = page.saturating_add(1);
                PageResult::Success(Page::new(page, ids))
            }
            Err(e) => {
                warn!(page, error = %e, kind = %e.kind(), "Page request failed");
                PageResult::Failure(e)
            }
        }
    }
}
