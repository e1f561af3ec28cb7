//! Paged feed loading with generation-guarded completions.
//!
//! The loader is single-writer: only [`FeedLoader::reset`], [`FeedLoader::load_more`]
//! and [`FeedLoader::apply`] touch [`FeedState`]. Fetches run as spawned tokio
//! tasks that report back through an mpsc channel, tagged with the generation
//! that was current when the request was made. A completion whose generation no
//! longer matches belongs to a superseded query and is dropped without touching
//! state.
//!
//! # Paging
//!
//! `reset` rewinds `current_page` to 1 and `has_more` to `true` before its
//! fetch is spawned, so a reset whose fetch fails still leaves paging at the
//! start of the new query. Items are only replaced when the fetch succeeds.
//! `load_more` requests `current_page` and advances it on success, so the
//! first `load_more` after a reset asks for page 1 again. Items are never
//! deduplicated; overlapping pages simply append.
//!
//! # Limitations
//!
//! No timeout is applied to a fetch. A collaborator that never answers leaves
//! `is_loading` set until the next `reset`.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::query::Query;
use crate::api::{FetchError, Page, PageFetcher};

/// Items per page in the explore feed.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Completion channel capacity. At most one fetch is current, the rest are stale.
const EVENT_CHANNEL_CAPACITY: usize = 16;

// ============================================================================
// State
// ============================================================================

/// Accumulated feed pagination state.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    items: Vec<T>,
    current_page: u32,
    has_more: bool,
    is_loading: bool,
}

impl<T> FeedState<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            has_more: true,
            is_loading: false,
        }
    }

    /// Items in arrival order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

// ============================================================================
// Events and Outcomes
// ============================================================================

/// Which operation a fetch was started by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Reset,
    Append,
}

/// Completion of one spawned fetch.
#[derive(Debug)]
pub struct FeedEvent<T> {
    generation: u64,
    kind: FetchKind,
    page: u32,
    result: Result<Page<T>, FetchError>,
}

impl<T> FeedEvent<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

/// What applying a completion did to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A reset landed; `items` now holds exactly `count` entries.
    Replaced { count: usize },
    /// A page was appended.
    Appended { count: usize },
    /// The fetch failed; only `is_loading` changed.
    Failed(FetchError),
    /// The completion belonged to a superseded generation and was ignored.
    Stale,
}

// ============================================================================
// FeedLoader
// ============================================================================

pub struct FeedLoader<F: PageFetcher> {
    fetcher: Arc<F>,
    page_size: u32,
    state: FeedState<F::Item>,
    query: Option<Query>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    event_tx: mpsc::Sender<FeedEvent<F::Item>>,
    event_rx: mpsc::Receiver<FeedEvent<F::Item>>,
}

impl<F: PageFetcher> FeedLoader<F> {
    pub fn new(fetcher: Arc<F>, page_size: u32) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            page_size: page_size.max(1),
            state: FeedState::new(),
            query: None,
            generation: 0,
            in_flight: None,
            event_tx,
            event_rx,
        }
    }

    pub fn state(&self) -> &FeedState<F::Item> {
        &self.state
    }

    pub fn items(&self) -> &[F::Item] {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    /// The query the feed currently belongs to.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Switch the feed to `query` and load its first page.
    ///
    /// Any fetch still outstanding becomes stale: its task is aborted and, if
    /// its completion already reached the channel, [`apply`](Self::apply)
    /// discards it.
    pub fn reset(&mut self, query: Query) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            tracing::debug!(generation = self.generation, "Aborted superseded feed fetch");
        }

        self.generation = self.generation.wrapping_add(1);
        self.state.is_loading = true;
        self.state.current_page = 1;
        self.state.has_more = true;
        tracing::debug!(
            generation = self.generation,
            search = %query.search,
            category = %query.category,
            sort_by = %query.sort_by,
            "Feed reset"
        );
        self.query = Some(query.clone());
        self.spawn_fetch(query, 1, FetchKind::Reset);
    }

    /// Request the next page. Returns `false` without doing anything when the
    /// feed is exhausted, already loading, or has no query yet.
    pub fn load_more(&mut self) -> bool {
        if self.state.is_loading {
            tracing::debug!(generation = self.generation, "load_more ignored: already loading");
            return false;
        }
        if !self.state.has_more {
            tracing::debug!(generation = self.generation, "load_more ignored: feed exhausted");
            return false;
        }
        let Some(query) = self.query.clone() else {
            tracing::debug!("load_more ignored: no query set");
            return false;
        };

        self.state.is_loading = true;
        let page = self.state.current_page;
        self.spawn_fetch(query, page, FetchKind::Append);
        true
    }

    fn spawn_fetch(&mut self, query: Query, page: u32, kind: FetchKind) {
        let generation = self.generation;
        let page_size = self.page_size;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.event_tx.clone();

        tracing::debug!(generation, page, page_size, ?kind, "Spawning feed fetch");

        self.in_flight = Some(tokio::spawn(async move {
            let result = fetcher.fetch_page(&query, page, page_size).await;
            let event = FeedEvent {
                generation,
                kind,
                page,
                result,
            };
            if let Err(e) = tx.send(event).await {
                tracing::debug!(error = %e, "Feed loader dropped before fetch completed");
            }
        }));
    }

    /// Wait for the next fetch completion. Cancel-safe.
    ///
    /// Pends forever while nothing is in flight.
    pub async fn next_event(&mut self) -> FeedEvent<F::Item> {
        match self.event_rx.recv().await {
            Some(event) => event,
            // The loader owns a sender, so the channel cannot close.
            None => std::future::pending().await,
        }
    }

    /// Fold a completion into the feed state.
    pub fn apply(&mut self, event: FeedEvent<F::Item>) -> LoadOutcome {
        if event.generation != self.generation {
            tracing::debug!(
                event_generation = event.generation,
                current_generation = self.generation,
                page = event.page,
                "Discarding stale feed result"
            );
            return LoadOutcome::Stale;
        }

        // Only a reset bumps the generation, so a current-generation completion
        // is the single outstanding fetch.
        self.in_flight = None;
        self.state.is_loading = false;

        match event.result {
            Ok(page) => {
                let count = page.items.len();
                self.state.has_more = page.has_more;
                match event.kind {
                    FetchKind::Reset => {
                        self.state.items = page.items;
                        self.state.current_page = 1;
                        tracing::debug!(count, has_more = page.has_more, "Feed replaced");
                        LoadOutcome::Replaced { count }
                    }
                    FetchKind::Append => {
                        self.state.items.extend(page.items);
                        self.state.current_page = self.state.current_page.saturating_add(1);
                        tracing::debug!(
                            count,
                            total = self.state.items.len(),
                            next_page = self.state.current_page,
                            has_more = page.has_more,
                            "Feed page appended"
                        );
                        LoadOutcome::Appended { count }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    page = event.page,
                    kind = ?event.kind,
                    "Failed to load feed page"
                );
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Receive and apply one completion.
    pub async fn settle(&mut self) -> LoadOutcome {
        let event = self.next_event().await;
        self.apply(event)
    }
}

impl<F: PageFetcher> Drop for FeedLoader<F> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
