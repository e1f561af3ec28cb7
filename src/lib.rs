//! memefeed: the feed engine behind a meme-sharing site.
//!
//! - [`feed`] - Debounced queries, paged loading and infinite-scroll triggering
//! - [`session`] - The explore event loop tying the feed pieces together
//! - [`api`] - The paged-fetch trait and the in-memory meme service
//! - [`reactions`] - Likes and saves with a persistence port
//! - [`storage`] - SQLite-backed reaction persistence
//! - [`config`] - TOML configuration

pub mod api;
pub mod config;
pub mod feed;
pub mod reactions;
pub mod session;
pub mod storage;
