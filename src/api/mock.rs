//! In-memory meme service with artificial latency.
//!
//! Mirrors what the site's backend would answer: filtered, sorted and paged
//! listings, single-meme lookups, the leaderboard, uploads and comments. All
//! state lives in a `tokio::sync::RwLock` so the service can be shared behind an
//! `Arc` by the feed loader's spawned fetch tasks.

use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use super::seed::{seed_memes, seed_users};
use super::types::{
    Comment, CommentAuthor, Leaderboard, Meme, MemeUpload, Page, SearchParams, User,
    DEFAULT_LIMIT,
};
use super::{FetchError, PageFetcher};
use crate::feed::{Category, Query, SortBy};

/// Maximum title length accepted by uploads.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum number of tags per meme.
pub const MAX_TAGS: usize = 10;

/// Number of memes shown on the leaderboard.
const LEADERBOARD_SIZE: usize = 10;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please provide a title for your meme")]
    MissingTitle,

    #[error("Title exceeds {max} characters")]
    TitleTooLong { max: usize },

    #[error("Please upload an image")]
    MissingImage,

    #[error("You can only add up to {max} tags")]
    TooManyTags { max: usize },

    #[error("Tag '{0}' already exists")]
    DuplicateTag(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("Comment cannot be empty")]
    Empty,

    #[error("Meme not found: {0}")]
    UnknownMeme(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Latency
// ============================================================================

/// Simulated round-trip times per operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    pub fetch: Duration,
    pub lookup: Duration,
    pub leaderboard: Duration,
    pub upload: Duration,
}

impl MockLatency {
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    pub fn uniform(d: Duration) -> Self {
        Self {
            fetch: d,
            lookup: d,
            leaderboard: d,
            upload: d,
        }
    }
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            fetch: Duration::from_millis(1000),
            lookup: Duration::from_millis(500),
            leaderboard: Duration::from_millis(800),
            upload: Duration::from_millis(2000),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(serde::Deserialize)]
struct CatalogFile {
    memes: Vec<Meme>,
    #[serde(default)]
    users: Vec<User>,
}

struct Catalog {
    memes: Vec<Meme>,
    users: Vec<User>,
}

// ============================================================================
// MockMemeApi
// ============================================================================

pub struct MockMemeApi {
    catalog: RwLock<Catalog>,
    latency: MockLatency,
    /// Number of upcoming listing requests that should fail.
    pending_failures: AtomicU32,
    fetch_count: AtomicU64,
}

impl MockMemeApi {
    pub fn new(memes: Vec<Meme>, users: Vec<User>, latency: MockLatency) -> Self {
        Self {
            catalog: RwLock::new(Catalog { memes, users }),
            latency,
            pending_failures: AtomicU32::new(0),
            fetch_count: AtomicU64::new(0),
        }
    }

    /// Service backed by the built-in seed catalog.
    pub fn seeded(latency: MockLatency) -> Self {
        Self::new(seed_memes(), seed_users(), latency)
    }

    /// Service backed by a JSON catalog file shaped `{"memes": [...], "users": [...]}`.
    pub fn from_file(path: &Path, latency: MockLatency) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            memes = file.memes.len(),
            users = file.users.len(),
            "Loaded meme catalog"
        );
        Ok(Self::new(file.memes, file.users, latency))
    }

    /// Make the next `n` listing requests fail with [`FetchError::Unavailable`].
    pub fn fail_next(&self, n: u32) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Number of listing requests served so far, failed ones included.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn delay(d: Duration) {
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Filter, sort and page the catalog.
    ///
    /// The category is applied first (`Trending` by likes, `New` by date),
    /// then `sort_by` re-sorts the result. Both sorts are stable.
    pub async fn fetch_memes(&self, params: &SearchParams) -> Result<Page<Meme>, FetchError> {
        Self::delay(self.latency.fetch).await;
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if self.take_failure() {
            tracing::debug!(page = params.page, "Injected fetch failure");
            return Err(FetchError::Unavailable("injected failure".to_string()));
        }

        let catalog = self.catalog.read().await;
        let mut memes: Vec<Meme> = match params.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => {
                let needle = search.to_lowercase();
                catalog
                    .memes
                    .iter()
                    .filter(|m| m.matches(&needle))
                    .cloned()
                    .collect()
            }
            _ => catalog.memes.clone(),
        };
        drop(catalog);

        match params.category {
            Some(Category::Trending) => memes.sort_by_key(|m| Reverse(m.likes)),
            Some(Category::New) => memes.sort_by_key(|m| Reverse(m.created_at)),
            Some(Category::Classic) | Some(Category::Random) | None => {}
        }

        match params.sort_by {
            Some(SortBy::Popular) => memes.sort_by_key(|m| Reverse(m.likes)),
            Some(SortBy::Recent) => memes.sort_by_key(|m| Reverse(m.created_at)),
            Some(SortBy::Comments) => memes.sort_by_key(|m| Reverse(m.comment_count)),
            None => {}
        }

        Ok(paginate(memes, params.page, params.limit))
    }

    /// The whole catalog in stored order.
    pub async fn trending_memes(&self) -> Vec<Meme> {
        Self::delay(self.latency.leaderboard).await;
        self.catalog.read().await.memes.clone()
    }

    pub async fn meme_by_id(&self, id: &str) -> Option<Meme> {
        Self::delay(self.latency.lookup).await;
        self.catalog
            .read()
            .await
            .memes
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub async fn top_memes(&self) -> Vec<Meme> {
        Self::delay(self.latency.leaderboard).await;
        let mut memes = self.catalog.read().await.memes.clone();
        memes.sort_by_key(|m| Reverse(m.likes));
        memes.truncate(LEADERBOARD_SIZE);
        memes
    }

    pub async fn top_users(&self) -> Vec<User> {
        Self::delay(self.latency.leaderboard).await;
        self.catalog.read().await.users.clone()
    }

    /// Fetch both leaderboard halves concurrently.
    pub async fn leaderboard(&self) -> Leaderboard {
        let (top_memes, top_users) = futures::join!(self.top_memes(), self.top_users());
        Leaderboard {
            top_memes,
            top_users,
        }
    }

    /// Memes sharing at least one tag with `id`, most shared tags first.
    pub async fn related_memes(&self, id: &str, limit: usize) -> Vec<Meme> {
        Self::delay(self.latency.lookup).await;
        let catalog = self.catalog.read().await;
        let Some(target) = catalog.memes.iter().find(|m| m.id == id) else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, &Meme)> = catalog
            .memes
            .iter()
            .filter(|m| m.id != target.id)
            .filter_map(|m| {
                let shared = m.tags.iter().filter(|t| target.tags.contains(t)).count();
                (shared > 0).then_some((shared, m))
            })
            .collect();
        scored.sort_by_key(|(shared, m)| (Reverse(*shared), Reverse(m.likes)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Tags ranked by how many memes carry them. Ties break alphabetically.
    pub async fn trending_tags(&self, limit: usize) -> Vec<(String, usize)> {
        let catalog = self.catalog.read().await;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in catalog.memes.iter().flat_map(|m| m.tags.iter()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(tag, n)| (tag.to_string(), n))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Validate and store an upload. Returns the new meme id.
    pub async fn upload_meme(&self, upload: MemeUpload, author: User) -> Result<String, UploadError> {
        let title = upload.title.trim();
        if title.is_empty() {
            return Err(UploadError::MissingTitle);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(UploadError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
            });
        }
        if upload.image_data.is_empty() {
            return Err(UploadError::MissingImage);
        }

        let mut tags: Vec<String> = Vec::with_capacity(upload.tags.len());
        for tag in upload.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if tags.iter().any(|t| t == tag) {
                return Err(UploadError::DuplicateTag(tag.to_string()));
            }
            tags.push(tag.to_string());
        }
        if tags.len() > MAX_TAGS {
            return Err(UploadError::TooManyTags { max: MAX_TAGS });
        }

        Self::delay(self.latency.upload).await;

        let now = Utc::now();
        let mut catalog = self.catalog.write().await;
        let base = format!("meme-{}", now.timestamp_millis());
        let mut id = base.clone();
        let mut n = 1;
        while catalog.memes.iter().any(|m| m.id == id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }

        catalog.memes.insert(
            0,
            Meme {
                id: id.clone(),
                title: title.to_string(),
                description: upload.description.filter(|d| !d.trim().is_empty()),
                image_url: upload.image_data,
                likes: 0,
                comment_count: 0,
                user: author,
                tags,
                created_at: now,
                comments: Vec::new(),
            },
        );
        tracing::info!(meme_id = %id, "Meme uploaded");
        Ok(id)
    }

    /// Prepend a comment to a meme and bump its comment count.
    pub async fn post_comment(
        &self,
        meme_id: &str,
        author: CommentAuthor,
        text: &str,
    ) -> Result<Comment, CommentError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(CommentError::Empty);
        }

        Self::delay(self.latency.lookup).await;

        let mut catalog = self.catalog.write().await;
        let meme = catalog
            .memes
            .iter_mut()
            .find(|m| m.id == meme_id)
            .ok_or_else(|| CommentError::UnknownMeme(meme_id.to_string()))?;

        let now = Utc::now();
        let comment = Comment {
            id: format!("temp-{}", now.timestamp_millis()),
            user: author,
            content: content.to_string(),
            created_at: now,
            likes: 0,
            replies: Vec::new(),
        };
        meme.comments.insert(0, comment.clone());
        meme.comment_count += 1;
        tracing::debug!(meme_id, comment_id = %comment.id, "Comment posted");
        Ok(comment)
    }
}

/// Slice one page out of an already ordered list.
///
/// `page` 0 is treated as 1 and `limit` 0 as [`DEFAULT_LIMIT`].
fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Page<T> {
    let page = page.max(1) as usize;
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit } as usize;
    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit);
    let has_more = end < items.len();
    let items = items.into_iter().skip(start).take(limit).collect();
    Page { items, has_more }
}

impl PageFetcher for MockMemeApi {
    type Item = Meme;

    async fn fetch_page(
        &self,
        query: &Query,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Meme>, FetchError> {
        let params = SearchParams {
            search: Some(query.search.clone()),
            category: Some(query.category),
            sort_by: Some(query.sort_by),
            page,
            limit: page_size,
        };
        self.fetch_memes(&params).await
    }
}
