//! Ordered, de-duplicated feed of resolved images.
//!
//! A single loader task pulls pages from the [`PageCursor`] one at a time
//! and resolves each page's images through the [`ImageStore`] with bounded
//! concurrency. Results are appended in page order, then in the order the
//! page listed them, regardless of which download finishes first.
//!
//! Observers read [`FeedState`] snapshots through [`GalleryFeed::subscribe`]
//! and receive [`FeedEvent`]s on the channel handed to [`GalleryFeed::new`].

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::page_cursor::PageCursor;
use crate::domain::entities::{FeedState, FeedStatus, ImageId, PageResult};
use crate::domain::errors::PageError;
use crate::infrastructure::image::ImageStore;

/// Default number of images resolved at once within a page.
pub const DEFAULT_MAX_CONCURRENT_RESOLVES: usize = 4;

/// Feed loader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    /// Images resolved concurrently within a page. Zero is treated as one.
    pub max_concurrent_resolves: usize,
    /// Pages loaded per `start()`; the loader goes idle afterwards.
    pub page_limit: Option<u32>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_concurrent_resolves: DEFAULT_MAX_CONCURRENT_RESOLVES,
            page_limit: None,
        }
    }
}

/// Notifications emitted by the loader task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A page finished resolving; `added` entries were appended.
    PageLoaded {
        /// Page number.
        page: u32,
        /// Entries appended after de-duplication.
        added: usize,
    },
    /// A page failed to load. The feed is paused until `retry()`.
    PageFailed {
        /// Page that failed; the next trigger requests it again.
        page: u32,
        /// Failure reason.
        error: PageError,
    },
    /// The configured page limit was reached for this trigger.
    LimitReached {
        /// Page the next trigger will request.
        next_page: u32,
    },
    /// The source has no more pages.
    Exhausted,
}

struct FeedInner {
    state: FeedState,
    seen: HashSet<ImageId>,
    running: bool,
    cancelled: bool,
}

struct FeedShared {
    cursor: tokio::sync::Mutex<PageCursor>,
    store: Arc<ImageStore>,
    config: FeedConfig,
    inner: Mutex<FeedInner>,
    state_tx: watch::Sender<FeedState>,
    event_tx: mpsc::UnboundedSender<FeedEvent>,
}

/// Owns the loader task and the accumulated feed state.
pub struct GalleryFeed {
    shared: Arc<FeedShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for GalleryFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("GalleryFeed")
            .field("entries", &inner.state.len())
            .field("status", &inner.state.status)
            .field("running", &inner.running)
            .finish_non_exhaustive()
    }
}

impl GalleryFeed {
    /// Creates an idle feed. Nothing is requested until [`start`](Self::start).
    #[must_use]
    pub fn new(
        cursor: PageCursor,
        store: Arc<ImageStore>,
        config: FeedConfig,
        event_tx: &mpsc::UnboundedSender<FeedEvent>,
    ) -> Self {
        let state = FeedState::new(cursor.next_page());
        let (state_tx, _) = watch::channel(state.clone());

        let shared = Arc::new(FeedShared {
            cursor: tokio::sync::Mutex::new(cursor),
            store,
            config,
            inner: Mutex::new(FeedInner {
                state,
                seen: HashSet::new(),
                running: false,
                cancelled: false,
            }),
            state_tx,
            event_tx: event_tx.clone(),
        });

        Self {
            shared,
            task: Mutex::new(None),
        }
    }

    /// Spawns the loader task unless one is already running.
    ///
    /// Returns false when nothing was started: a loader is active, the feed
    /// is exhausted, or it was cancelled. Must be called within a Tokio
    /// runtime.
    pub fn start(&self) -> bool {
        {
            let mut inner = self.shared.inner.lock();
            if inner.cancelled {
                warn!("Feed was cancelled, refusing to start");
                return false;
            }
            if inner.running {
                debug!("Feed loader already running");
                return false;
            }
            if inner.state.status == FeedStatus::Exhausted {
                debug!("Feed exhausted, nothing to load");
                return false;
            }

            inner.running = true;
            inner.state.status = FeedStatus::Loading;
            self.shared.publish(&inner.state);
        }

        info!(next_page = self.shared.inner.lock().state.next_page, "Starting feed loader");
        let handle = tokio::spawn(FeedShared::run(Arc::clone(&self.shared)));
        if let Some(previous) = self.task.lock().replace(handle) {
            trace!(finished = previous.is_finished(), "Replacing previous loader handle");
        }
        true
    }

    /// Restarts loading from the page that failed.
    pub fn retry(&self) -> bool {
        let last_error = self.shared.inner.lock().state.last_error.clone();
        if let Some(error) = last_error {
            info!(error = %error, "Retrying feed after failure");
        }
        self.start()
    }

    /// Retries only if the last failure is transient. A failure that asks
    /// callers to back off, such as a rate limit, leaves the feed paused.
    pub fn retry_if_transient(&self) -> bool {
        let back_off = self
            .shared
            .inner
            .lock()
            .state
            .last_error
            .as_ref()
            .is_some_and(PageError::should_back_off);
        if back_off {
            warn!("Last failure requires backing off, not retrying");
            return false;
        }
        self.retry()
    }

    /// Stops the loader. No further changes are made to the state.
    pub fn cancel(&self) {
        {
            let mut inner = self.shared.inner.lock();
            if !inner.cancelled {
                inner.cancelled = true;
                inner.running = false;
                inner.state.in_flight.clear();
                inner.state.status = FeedStatus::Cancelled;
                self.shared.publish(&inner.state);
                debug!(entries = inner.state.len(), "Feed cancelled");
            }
        }

        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current_state(&self) -> FeedState {
        self.shared.inner.lock().state.clone()
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.shared.state_tx.subscribe()
    }

    /// Returns true while a loader task is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.inner.lock().running
    }
}

impl Drop for GalleryFeed {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl FeedShared {
    async fn run(self: Arc<Self>) {
        let mut pages_loaded = 0u32;

        loop {
            if self.config.page_limit.is_some_and(|limit| pages_loaded >= limit) {
                let Some(next_page) = self.finish(FeedStatus::Idle) else {
                    return;
                };
                debug!(pages_loaded, next_page, "Page limit reached");
                self.emit(FeedEvent::LimitReached { next_page });
                return;
            }

            let (requested, result, next_page) = {
                let mut cursor = self.cursor.lock().await;
                let requested = cursor.next_page();
                let result = cursor.load_next().await;
                (requested, result, cursor.next_page())
            };

            match result {
                PageResult::Success(page) => {
                    let Some(added) = self.resolve_page(page.ids).await else {
                        return;
                    };

                    {
                        let mut inner = self.inner.lock();
                        if inner.cancelled {
                            return;
                        }
                        inner.state.next_page = next_page;
                        inner.state.last_error = None;
                        self.publish(&inner.state);
                    }

                    debug!(page = page.number, added, "Page appended to feed");
                    self.emit(FeedEvent::PageLoaded {
                        page: page.number,
                        added,
                    });
                    pages_loaded += 1;
                }
                PageResult::Failure(error) => {
                    {
                        let mut inner = self.inner.lock();
                        if inner.cancelled {
                            return;
                        }
                        inner.state.last_error = Some(error.clone());
                        inner.state.status = FeedStatus::Paused;
                        inner.running = false;
                        self.publish(&inner.state);
                    }

                    warn!(page = requested, error = %error, "Feed paused on page failure");
                    self.emit(FeedEvent::PageFailed {
                        page: requested,
                        error,
                    });
                    return;
                }
                PageResult::Exhausted => {
                    if self.finish(FeedStatus::Exhausted).is_some() {
                        info!(page = requested, "Feed exhausted");
                        self.emit(FeedEvent::Exhausted);
                    }
                    return;
                }
            }
        }
    }

    /// Resolves one page and appends it. Returns the number of appended
    /// entries, or `None` if the feed was cancelled meanwhile.
    async fn resolve_page(&self, ids: Vec<ImageId>) -> Option<usize> {
        let pending: Vec<ImageId> = {
            let mut inner = self.inner.lock();
            if inner.cancelled {
                return None;
            }

            let mut pending = Vec::with_capacity(ids.len());
            for id in ids {
                if inner.seen.contains(&id) || inner.state.in_flight.contains(&id) {
                    trace!(id = %id, "Skipping duplicate image");
                    continue;
                }
                inner.state.in_flight.insert(id.clone());
                pending.push(id);
            }
            self.publish(&inner.state);
            pending
        };

        let store = &self.store;
        let mut resolved = stream::iter(pending)
            .map(|id| async move { store.resolve(&id).await })
            .buffered(self.config.max_concurrent_resolves.max(1));

        let mut added = 0;
        while let Some(entry) = resolved.next().await {
            let mut inner = self.inner.lock();
            if inner.cancelled {
                return None;
            }
            inner.state.in_flight.remove(&entry.id);
            inner.seen.insert(entry.id.clone());
            inner.state.entries.push(Arc::new(entry));
            added += 1;
            self.publish(&inner.state);
        }

        Some(added)
    }

    /// Marks the loader stopped with `status`. Returns the next page, or
    /// `None` if the feed was cancelled.
    fn finish(&self, status: FeedStatus) -> Option<u32> {
        let mut inner = self.inner.lock();
        if inner.cancelled {
            return None;
        }
        inner.state.status = status;
        inner.running = false;
        self.publish(&inner.state);
        Some(inner.state.next_page)
    }

    fn publish(&self, state: &FeedState) {
        self.state_tx.send_replace(state.clone());
    }

    fn emit(&self, event: FeedEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("Feed event receiver dropped");
        }
    }
}
