use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Query Components
// ============================================================================

/// Feed tab selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Trending,
    New,
    Classic,
    Random,
}

/// Ordering applied after the category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Popular,
    Recent,
    Comments,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Trending => "trending",
            Category::New => "new",
            Category::Classic => "classic",
            Category::Random => "random",
        }
    }
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Popular => "popular",
            SortBy::Recent => "recent",
            SortBy::Comments => "comments",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category or sort key.
#[derive(Debug, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseQueryError {
    kind: &'static str,
    value: String,
}

impl FromStr for Category {
    type Err = ParseQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trending" => Ok(Category::Trending),
            "new" => Ok(Category::New),
            "classic" => Ok(Category::Classic),
            "random" => Ok(Category::Random),
            _ => Err(ParseQueryError {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for SortBy {
    type Err = ParseQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popular" => Ok(SortBy::Popular),
            "recent" => Ok(SortBy::Recent),
            "comments" => Ok(SortBy::Comments),
            _ => Err(ParseQueryError {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// The settled search tuple a feed is loaded for.
///
/// Queries are plain values: changing any component produces a new `Query`
/// that replaces the previous one as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Query {
    pub search: String,
    pub category: Category,
    pub sort_by: SortBy,
}

impl Query {
    pub fn new(search: impl Into<String>, category: Category, sort_by: SortBy) -> Self {
        Self {
            search: search.into(),
            category,
            sort_by,
        }
    }
}
