use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use memefeed::api::{MockMemeApi, PageFetcher};
use memefeed::config::Config;
use memefeed::feed::{Category, Query, SortBy};
use memefeed::reactions::{MemoryReactions, ReactionPersistence, ReactionStore};
use memefeed::session::{ExploreSession, SessionCommand};
use memefeed::storage::{Database, DatabaseError};

/// Upper bound on waiting for one page, so a stuck fetch cannot hang the CLI.
const PAGE_WAIT: Duration = Duration::from_secs(30);

/// Get the config directory path (~/.config/memefeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("memefeed"))
}

#[derive(Parser, Debug)]
#[command(name = "memefeed", about = "Browse the meme feed from the terminal")]
struct Args {
    /// Config file (defaults to ~/.config/memefeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search text matched against titles and tags
    #[arg(long, default_value = "")]
    search: String,

    /// Feed tab: trending, new, classic or random
    #[arg(long, default_value = "trending")]
    category: Category,

    /// Sort order: popular, recent or comments
    #[arg(long, default_value = "popular")]
    sort: SortBy,

    /// Number of extra pages to scroll through after the first
    #[arg(long, default_value_t = 0)]
    pages: u32,

    /// Toggle the like flag on a meme before listing
    #[arg(long, value_name = "ID")]
    like: Vec<String>,

    /// Toggle the save flag on a meme before listing
    #[arg(long, value_name = "ID")]
    save: Vec<String>,

    /// Print the leaderboard instead of the feed
    #[arg(long)]
    leaderboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let latency = config.latency.to_latency();
    let api = match &config.catalog_path {
        Some(path) => MockMemeApi::from_file(path, latency)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => MockMemeApi::seeded(latency),
    };
    let api = Arc::new(api);

    match &config.database_path {
        Some(path) => {
            let path_str = path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
            let db = match Database::open(path_str).await {
                Ok(db) => db,
                Err(DatabaseError::InstanceLocked) => {
                    eprintln!("Error: Another instance of memefeed appears to be running.");
                    std::process::exit(1);
                }
                Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
            };
            run(&args, &config, api, ReactionStore::load(db).await).await
        }
        None => run(&args, &config, api, ReactionStore::load(MemoryReactions::default()).await).await,
    }
}

async fn run<P: ReactionPersistence>(
    args: &Args,
    config: &Config,
    api: Arc<MockMemeApi>,
    mut reactions: ReactionStore<P>,
) -> Result<()> {
    for id in &args.like {
        let liked = reactions.toggle_like(id).await;
        println!("{} meme {}", if liked { "Liked" } else { "Unliked" }, id);
    }
    for id in &args.save {
        let saved = reactions.toggle_save(id).await;
        println!("{} meme {}", if saved { "Saved" } else { "Unsaved" }, id);
    }

    if args.leaderboard {
        let board = api.leaderboard().await;
        println!("Top memes:");
        for (rank, meme) in board.top_memes.iter().enumerate() {
            println!("  {:>2}. {} ({} likes)", rank + 1, meme.title, reactions.display_likes(meme));
        }
        println!("Top creators:");
        for (rank, user) in board.top_users.iter().enumerate() {
            println!(
                "  {:>2}. @{} {} ({} likes)",
                rank + 1,
                user.username,
                user.badge.as_deref().unwrap_or(""),
                user.total_likes.unwrap_or(0)
            );
        }
        return Ok(());
    }

    let query = Query::new(args.search.clone(), args.category, args.sort);
    let mut session = ExploreSession::new(Arc::clone(&api), config.page_size, config.debounce(), query);
    session.start();
    wait_page(&mut session).await?;

    for _ in 0..args.pages {
        if !session.loader().has_more() {
            break;
        }
        // Scroll the sentinel out of view and back in.
        session.handle_command(SessionCommand::SentinelVisible(false));
        session.handle_command(SessionCommand::SentinelVisible(true));
        wait_page(&mut session).await?;
    }

    let snapshot = session.snapshot();
    if snapshot.items.is_empty() {
        println!("No memes found");
        return Ok(());
    }
    for meme in &snapshot.items {
        println!(
            "{:>6} {} {:<55} {:>6} likes {:>4} comments  #{}",
            meme.id,
            if reactions.is_saved(&meme.id) { "*" } else { " " },
            meme.title,
            reactions.display_likes(meme),
            meme.comment_count,
            meme.tags.join(" #")
        );
    }
    println!(
        "{} memes, page {}{}",
        snapshot.items.len(),
        snapshot.current_page,
        if snapshot.has_more { ", more available" } else { "" }
    );
    Ok(())
}

async fn wait_page<F: PageFetcher>(session: &mut ExploreSession<F>) -> Result<()> {
    tokio::time::timeout(PAGE_WAIT, session.wait_idle())
        .await
        .context("Timed out waiting for the feed to load")
}
