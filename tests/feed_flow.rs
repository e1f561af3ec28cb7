//! Integration tests for the explore flow: mock API → feed loader → session.
//!
//! Every test runs on tokio's paused clock, so the mock API's artificial
//! latency and the debounce delay cost no wall time.

use memefeed::api::{Meme, MockLatency, MockMemeApi, Page, SearchParams, User};
use memefeed::feed::{Category, FeedLoader, LoadOutcome, Query, SortBy};
use memefeed::session::{ExploreSession, SessionCommand};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn creator() -> User {
    User {
        id: "u1".to_string(),
        name: "Tester".to_string(),
        username: "tester".to_string(),
        avatar: String::new(),
        bio: None,
        followers: 0,
        following: 0,
        meme_count: 0,
        total_likes: None,
        badge: None,
    }
}

/// `n` memes with ids "0".."n", likes descending so popular order is id order.
fn catalog(n: usize) -> Vec<Meme> {
    (0..n)
        .map(|i| Meme {
            id: i.to_string(),
            title: if i % 2 == 0 {
                format!("Cat picture {}", i)
            } else {
                format!("Dog picture {}", i)
            },
            description: None,
            image_url: String::new(),
            likes: (1000 - i) as u64,
            comment_count: i as u64,
            user: creator(),
            tags: Vec::new(),
            created_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH + chrono::Duration::hours(i as i64),
            comments: Vec::new(),
        })
        .collect()
}

fn api(n: usize, latency_ms: u64) -> Arc<MockMemeApi> {
    Arc::new(MockMemeApi::new(
        catalog(n),
        vec![creator()],
        MockLatency::uniform(Duration::from_millis(latency_ms)),
    ))
}

fn ids(items: &[Meme]) -> Vec<String> {
    items.iter().map(|m| m.id.clone()).collect()
}

fn range_ids(r: std::ops::Range<usize>) -> Vec<String> {
    r.map(|i| i.to_string()).collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pagination_math_page_size_nine() {
    let api = api(20, 1000);

    let page2: Page<Meme> = api
        .fetch_memes(&SearchParams {
            page: 2,
            limit: 9,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&page2.items), range_ids(9..18));
    assert!(page2.has_more);

    let page3 = api
        .fetch_memes(&SearchParams {
            page: 3,
            limit: 9,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&page3.items), range_ids(18..20));
    assert!(!page3.has_more);
}

// ============================================================================
// Feed Loader Against the Mock API
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_scrolling_until_exhausted() {
    let api = api(20, 1000);
    let mut loader = FeedLoader::new(Arc::clone(&api), 9);

    loader.reset(Query::default());
    assert_eq!(loader.settle().await, LoadOutcome::Replaced { count: 9 });

    // First load_more re-reads page 1, then pages advance.
    let mut appended = Vec::new();
    while loader.load_more() {
        match loader.settle().await {
            LoadOutcome::Appended { count } => appended.push(count),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
    assert_eq!(appended, vec![9, 9, 2]);
    assert!(!loader.has_more());
    assert_eq!(loader.items().len(), 29);
    assert_eq!(ids(&loader.items()[18..]), range_ids(9..20));

    let fetched = api.fetch_count();
    assert!(!loader.load_more());
    assert_eq!(api.fetch_count(), fetched);
}

#[tokio::test(start_paused = true)]
async fn test_injected_failure_does_not_corrupt_feed() {
    let api = api(20, 100);
    let mut loader = FeedLoader::new(Arc::clone(&api), 9);
    loader.reset(Query::default());
    loader.settle().await;
    let before = loader.state().clone();

    api.fail_next(1);
    assert!(loader.load_more());
    assert!(matches!(loader.settle().await, LoadOutcome::Failed(_)));
    assert_eq!(loader.state(), &before);
}

#[tokio::test(start_paused = true)]
async fn test_filter_and_sort_flow_through_query() {
    let api = api(6, 10);
    let mut loader = FeedLoader::new(api, 9);

    loader.reset(Query::new("dog", Category::Classic, SortBy::Comments));
    loader.settle().await;
    assert_eq!(ids(loader.items()), vec!["5", "3", "1"]);

    loader.reset(Query::new("", Category::New, SortBy::Recent));
    loader.settle().await;
    assert_eq!(ids(loader.items()), vec!["5", "4", "3", "2", "1", "0"]);
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_old_query_never_overwrites_new_one() {
    let api = api(20, 1000);
    let mut session = ExploreSession::new(
        Arc::clone(&api),
        9,
        Duration::from_millis(500),
        Query::default(),
    );
    session.start();

    // Switch tabs while the first page is still in flight.
    tokio::time::advance(Duration::from_millis(10)).await;
    session.handle_command(SessionCommand::Category(Category::New));
    session.wait_idle().await;

    let snap = session.snapshot();
    assert_eq!(snap.query.map(|q| q.category), Some(Category::New));
    assert_eq!(snap.items.len(), 9);
    assert!(!snap.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_search_then_scroll() {
    let api = api(30, 50);
    let mut session = ExploreSession::new(
        Arc::clone(&api),
        9,
        Duration::from_millis(500),
        Query::default(),
    );
    session.start();
    session.wait_idle().await;

    session.handle_command(SessionCommand::Search("c".to_string()));
    session.handle_command(SessionCommand::Search("cat".to_string()));
    session.wait_idle().await;
    assert_eq!(session.snapshot().items.len(), 9);

    session.handle_command(SessionCommand::SentinelVisible(true));
    session.wait_idle().await;

    let snap = session.snapshot();
    assert_eq!(snap.items.len(), 18);
    assert!(snap.items.iter().all(|m| m.title.starts_with("Cat")));
    assert_eq!(api.fetch_count(), 3);
}
