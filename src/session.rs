//! Explore session event loop.
//!
//! Wires the debouncer, the feed loader and the sentinel trigger together.
//! Search text is debounced; category and sort changes apply at once using the
//! last settled search text. A settled query that differs from the one the
//! feed belongs to resets the feed. A rising sentinel edge asks for one more
//! page.
//!
//! [`ExploreSession::run`] multiplexes three sources with `tokio::select!`:
//! - **Commands**: input from the rendering layer via an mpsc channel
//! - **Debounce**: the settled search text
//! - **Fetch completions**: pages arriving from spawned fetch tasks
//!
//! After every handled event the current [`FeedSnapshot`] is published on a
//! `watch` channel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::api::PageFetcher;
use crate::feed::{
    Category, Debouncer, FeedLoader, LoadOutcome, Query, SortBy, VisibilityTrigger,
};

/// Input from the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Raw search box contents (debounced).
    Search(String),
    /// Tab switch (applied immediately).
    Category(Category),
    /// Sort order change (applied immediately).
    Sort(SortBy),
    /// Latest visibility sample of the end-of-list sentinel.
    SentinelVisible(bool),
    Shutdown,
}

/// Result of handling a command.
pub enum Action {
    Continue,
    Quit,
}

/// What the rendering layer needs to draw the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot<T> {
    pub query: Option<Query>,
    pub items: Vec<T>,
    pub has_more: bool,
    pub is_loading: bool,
    pub current_page: u32,
}

impl<T> Default for FeedSnapshot<T> {
    fn default() -> Self {
        Self {
            query: None,
            items: Vec::new(),
            has_more: true,
            is_loading: false,
            current_page: 1,
        }
    }
}

pub struct ExploreSession<F: PageFetcher> {
    loader: FeedLoader<F>,
    debouncer: Debouncer<String>,
    trigger: VisibilityTrigger,
    /// Last settled search text.
    search: String,
    category: Category,
    sort_by: SortBy,
}

impl<F: PageFetcher> ExploreSession<F> {
    pub fn new(fetcher: Arc<F>, page_size: u32, debounce: Duration, initial: Query) -> Self {
        Self {
            loader: FeedLoader::new(fetcher, page_size),
            debouncer: Debouncer::new(debounce),
            trigger: VisibilityTrigger::new(),
            search: initial.search,
            category: initial.category,
            sort_by: initial.sort_by,
        }
    }

    pub fn loader(&self) -> &FeedLoader<F> {
        &self.loader
    }

    /// The query built from the settled search and current filters.
    pub fn current_query(&self) -> Query {
        Query::new(self.search.clone(), self.category, self.sort_by)
    }

    pub fn snapshot(&self) -> FeedSnapshot<F::Item> {
        let state = self.loader.state();
        FeedSnapshot {
            query: self.loader.query().cloned(),
            items: state.items().to_vec(),
            has_more: state.has_more(),
            is_loading: state.is_loading(),
            current_page: state.current_page(),
        }
    }

    /// Load the first page for the initial query.
    pub fn start(&mut self) {
        let query = self.current_query();
        tracing::info!(search = %query.search, category = %query.category, sort_by = %query.sort_by, "Explore session started");
        self.loader.reset(query);
    }

    /// Reset the feed if `query` differs from the one it belongs to.
    fn apply_query(&mut self) {
        let query = self.current_query();
        if self.loader.query() == Some(&query) {
            tracing::debug!("Query unchanged, keeping feed");
            return;
        }
        self.loader.reset(query);
    }

    pub fn handle_command(&mut self, command: SessionCommand) -> Action {
        match command {
            SessionCommand::Search(text) => {
                self.debouncer.observe(text);
            }
            SessionCommand::Category(category) => {
                self.category = category;
                self.apply_query();
            }
            SessionCommand::Sort(sort_by) => {
                self.sort_by = sort_by;
                self.apply_query();
            }
            SessionCommand::SentinelVisible(visible) => {
                if self.trigger.observe(visible) && !self.loader.load_more() {
                    tracing::debug!(
                        is_loading = self.loader.is_loading(),
                        has_more = self.loader.has_more(),
                        "Sentinel edge did not start a fetch"
                    );
                }
            }
            SessionCommand::Shutdown => return Action::Quit,
        }
        Action::Continue
    }

    fn on_search_settled(&mut self, search: String) {
        tracing::debug!(search = %search, "Search settled");
        self.search = search;
        self.apply_query();
    }

    fn on_load_outcome(&self, outcome: &LoadOutcome) {
        if let LoadOutcome::Failed(e) = outcome {
            tracing::debug!(error = %e, "Feed stopped growing after fetch failure");
        }
    }

    /// Process pending debounce and fetch work until neither is outstanding.
    ///
    /// A hung fetch makes this wait forever; callers that need a bound wrap
    /// it in `tokio::time::timeout`.
    pub async fn wait_idle(&mut self) {
        while self.loader.is_loading() || self.debouncer.is_pending() {
            tokio::select! {
                search = self.debouncer.settled() => self.on_search_settled(search),
                event = self.loader.next_event() => {
                    let outcome = self.loader.apply(event);
                    self.on_load_outcome(&outcome);
                }
            }
        }
    }

    /// Run until `Shutdown` arrives or the command channel closes.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        updates: watch::Sender<FeedSnapshot<F::Item>>,
    ) {
        self.start();
        updates.send_replace(self.snapshot());

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    match command {
                        Some(command) => {
                            if let Action::Quit = self.handle_command(command) {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                event = self.loader.next_event() => {
                    let outcome = self.loader.apply(event);
                    self.on_load_outcome(&outcome);
                }

                search = self.debouncer.settled() => self.on_search_settled(search),
            }

            updates.send_replace(self.snapshot());
        }

        self.debouncer.cancel();
        tracing::info!("Explore session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockLatency, MockMemeApi};

    fn session(latency_ms: u64) -> (ExploreSession<MockMemeApi>, Arc<MockMemeApi>) {
        let api = Arc::new(MockMemeApi::seeded(MockLatency::uniform(Duration::from_millis(
            latency_ms,
        ))));
        let session = ExploreSession::new(
            Arc::clone(&api),
            3,
            Duration::from_millis(500),
            Query::default(),
        );
        (session, api)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_first_page() {
        let (mut s, api) = session(100);
        s.start();
        assert!(s.snapshot().is_loading);
        s.wait_idle().await;

        let snap = s.snapshot();
        assert_eq!(snap.items.len(), 3);
        assert!(snap.has_more);
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_collapses_into_one_reset() {
        let (mut s, api) = session(10);
        s.start();
        s.wait_idle().await;

        for text in ["c", "ca", "cat"] {
            s.handle_command(SessionCommand::Search(text.to_string()));
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        s.wait_idle().await;

        assert_eq!(api.fetch_count(), 2);
        assert_eq!(s.current_query().search, "cat");
        assert!(s
            .snapshot()
            .items
            .iter()
            .all(|m| m.matches("cat")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_settled_query_does_not_refetch() {
        let (mut s, api) = session(10);
        s.start();
        s.wait_idle().await;

        s.handle_command(SessionCommand::Search("x".to_string()));
        s.handle_command(SessionCommand::Search(String::new()));
        s.wait_idle().await;
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_change_applies_immediately() {
        let (mut s, _) = session(10);
        s.start();
        s.wait_idle().await;

        s.handle_command(SessionCommand::Category(Category::New));
        assert!(s.loader().is_loading());
        assert_eq!(
            s.loader().query().map(|q| q.category),
            Some(Category::New)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_triggers_only_on_rising_edge() {
        let (mut s, api) = session(10);
        s.start();
        s.wait_idle().await;

        s.handle_command(SessionCommand::SentinelVisible(true));
        s.wait_idle().await;
        s.handle_command(SessionCommand::SentinelVisible(true));
        s.handle_command(SessionCommand::SentinelVisible(true));
        s.wait_idle().await;
        assert_eq!(api.fetch_count(), 2);

        s.handle_command(SessionCommand::SentinelVisible(false));
        s.handle_command(SessionCommand::SentinelVisible(true));
        s.wait_idle().await;
        assert_eq!(api.fetch_count(), 3);
        assert_eq!(s.snapshot().items.len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_publishes_snapshots_and_stops() {
        let (s, _) = session(10);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (update_tx, mut update_rx) = watch::channel(FeedSnapshot::default());
        let handle = tokio::spawn(s.run(cmd_rx, update_tx));

        update_rx
            .wait_for(|snap| !snap.is_loading && !snap.items.is_empty())
            .await
            .unwrap();

        cmd_tx
            .send(SessionCommand::Search("cats".to_string()))
            .await
            .unwrap();
        let snap = update_rx
            .wait_for(|snap| {
                snap.query.as_ref().map(|q| q.search.as_str()) == Some("cats") && !snap.is_loading
            })
            .await
            .unwrap()
            .clone();
        assert!(snap.items.iter().all(|m| m.matches("cats")));

        cmd_tx.send(SessionCommand::Shutdown).await.unwrap();
        handle.await.unwrap();
    }
}
