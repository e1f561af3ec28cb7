//! Data access for the meme site.
//!
//! Everything the feed reads goes through the [`PageFetcher`] trait so the
//! loader never depends on a concrete backend. The only backend shipped here is
//! [`MockMemeApi`], an in-memory catalog with artificial latency.
//!
//! # Architecture
//!
//! - [`types`] - Wire-shaped records (`Meme`, `User`, `Comment`) and `Page`
//! - [`mock`] - The in-memory service: search, paging, leaderboard, uploads, comments
//! - [`seed`] - Built-in catalog used when no catalog file is configured

mod mock;
mod seed;
mod types;

use std::future::Future;
use thiserror::Error;

use crate::feed::Query;

pub use mock::{CatalogError, CommentError, MockLatency, MockMemeApi, UploadError};
pub use seed::{seed_memes, seed_users};
pub use types::{
    Comment, CommentAuthor, Leaderboard, Meme, MemeUpload, Page, SearchParams, User,
    DEFAULT_LIMIT,
};

// ============================================================================
// Error Types
// ============================================================================

/// A paged fetch that did not produce a page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The service is (temporarily) unable to answer.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Any other failure reported by the collaborator.
    #[error("Fetch failed: {0}")]
    Other(String),
}

// ============================================================================
// Paged Fetch Collaborator
// ============================================================================

/// Source of pages for a [`Query`].
///
/// Calls must be idempotent per `(query, page, page_size)` from the caller's
/// point of view: repeating one may return fresher data but must not affect
/// loader state. Pages are 1-based.
pub trait PageFetcher: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    fn fetch_page(
        &self,
        query: &Query,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<Self::Item>, FetchError>> + Send;
}
