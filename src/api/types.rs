use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::{Category, SortBy};

// ============================================================================
// Paging
// ============================================================================

/// One batch of items plus the continuation flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_more: bool) -> Self {
        Self { items, has_more }
    }
}

/// Full parameter set for a meme listing request.
///
/// `page` and `limit` of 0 fall back to 1 and [`DEFAULT_LIMIT`] respectively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub sort_by: Option<SortBy>,
    pub page: u32,
    pub limit: u32,
}

/// Page size used when a request leaves `limit` unset.
pub const DEFAULT_LIMIT: u32 = 10;

// ============================================================================
// Domain Records
// ============================================================================

/// A site user as shown on profiles, meme cards and the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub meme_count: u64,
    #[serde(default)]
    pub total_likes: Option<u64>,
    #[serde(default)]
    pub badge: Option<String>,
}

/// Author block embedded in a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub name: String,
    pub username: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user: CommentAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meme {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    pub likes: u64,
    pub comment_count: u64,
    pub user: User,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Meme {
    /// Case-insensitive match against the title or any tag.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle_lower))
    }
}

/// Payload of a meme upload. The image arrives already composited.
#[derive(Debug, Clone, Default)]
pub struct MemeUpload {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub image_data: String,
}

/// Both halves of the leaderboard page.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    pub top_memes: Vec<Meme>,
    pub top_users: Vec<User>,
}
