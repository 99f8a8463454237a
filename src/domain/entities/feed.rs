//! Accumulated feed state observed by the display layer.

use std::collections::HashSet;
use std::sync::Arc;

use super::{ImageId, ResolvedImage};
use crate::domain::errors::PageError;

/// Lifecycle of the feed loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    /// Not loading; can be started.
    #[default]
    Idle,
    /// A loader task is pulling pages.
    Loading,
    /// A page failed; waiting for an explicit retry.
    Paused,
    /// The source has no more pages.
    Exhausted,
    /// The feed was discarded.
    Cancelled,
}

/// Snapshot of the feed.
#[derive(Debug, Clone)]
pub struct FeedState {
    /// Resolved images in page order, then intra-page order. Shared, so
    /// cloning a snapshot does not copy the images or their identifiers.
    pub entries: Vec<Arc<ResolvedImage>>,
    /// Next page the cursor will request.
    pub next_page: u32,
    /// Identifiers currently being resolved.
    pub in_flight: HashSet<ImageId>,
    /// Loader status.
    pub status: FeedStatus,
    /// Most recent page failure, cleared by the next successful page.
    pub last_error: Option<PageError>,
}

impl FeedState {
    /// Creates an empty state that will start at `next_page`.
    #[must_use]
    pub fn new(next_page: u32) -> Self {
        Self {
            entries: Vec::new(),
            next_page,
            in_flight: HashSet::new(),
            status: FeedStatus::Idle,
            last_error: None,
        }
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `id` is already in the accumulated sequence.
    #[must_use]
    pub fn contains(&self, id: &ImageId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    /// Identifiers in display order.
    pub fn ids(&self) -> impl Iterator<Item = &ImageId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    /// Number of entries that fell back to the placeholder.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_placeholder()).count()
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(1)
    }
}
