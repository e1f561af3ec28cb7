//! The explore feed core: debounced queries, paged loading, infinite scroll.
//!
//! - [`query`] - The settled `Query` tuple and its components
//! - [`debounce`] - Quiet-period collapsing of rapid input
//! - [`loader`] - Pagination state and generation-guarded fetch completions
//! - [`trigger`] - Rising-edge detection for the end-of-list sentinel
//!
//! # Example
//!
//! ```ignore
//! use memefeed::feed::{FeedLoader, Query};
//!
//! let mut loader = FeedLoader::new(api, 9);
//! loader.reset(Query::default());
//! loader.settle().await;
//! if trigger.observe(sentinel_visible) {
//!     loader.load_more();
//! }
//! ```

mod debounce;
mod loader;
mod query;
mod trigger;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use loader::{FeedEvent, FeedLoader, FeedState, FetchKind, LoadOutcome, DEFAULT_PAGE_SIZE};
pub use query::{Category, ParseQueryError, Query, SortBy};
pub use trigger::VisibilityTrigger;
