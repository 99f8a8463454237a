//! Page of photo identifiers returned by the list endpoint.

use super::ImageId;
use crate::domain::errors::PageError;

/// One page of the photo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number, starting at 1.
    pub number: u32,
    /// Photo identifiers in the order the API returned them.
    pub ids: Vec<ImageId>,
}

impl Page {
    /// Creates a page.
    #[must_use]
    pub const fn new(number: u32, ids: Vec<ImageId>) -> Self {
        Self { number, ids }
    }

    /// Number of identifiers on the page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the page holds no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Outcome of asking the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// The page loaded; the cursor moved past it.
    Success(Page),
    /// The page failed; the cursor still points at it.
    Failure(PageError),
    /// The source reported the end of results.
    Exhausted,
}

impl PageResult {
    /// Returns true for `Success`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
