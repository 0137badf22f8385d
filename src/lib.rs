//! thoughtcast — episode feed and playback service for the Four Cs podcast
//! site.
//!
//! Three cooperating pieces: feed ingestion (RSS → themed [`model::Episode`]
//! records), the shared playback controller ([`player::Player`], one live
//! audio handle, published transport state), and the durable bookmark set.
//! The HTTP layer in [`api`] is the only surface the site talks to.

pub mod api;
pub mod bookmarks;
pub mod classify;
pub mod config;
pub mod error;
pub mod feed;
pub mod model;
pub mod player;

use bookmarks::BookmarkStore;
use config::Config;
use feed::FeedClient;
use player::clock::ClockBackend;
use player::Player;
use std::sync::Arc;

/// Shared handles for the HTTP layer. Cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedClient>,
    pub player: Arc<Player>,
    pub bookmarks: Arc<BookmarkStore>,
}

/// Build state from config and serve until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let feed = Arc::new(FeedClient::new(&config.feed.url)?);
    tracing::info!("Feed source: {}", feed.url());
    let bookmarks = Arc::new(BookmarkStore::open(&config.data_dir())?);
    let player = Player::new(Arc::new(ClockBackend::new()), &config.player);

    let state = AppState {
        feed,
        player,
        bookmarks,
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("thoughtcast listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
