//! HTTP surface for the landing site: episodes, themes, the shared player's
//! transport operations, and bookmarks.

use crate::error::AppError;
use crate::model::{core_concepts, CoreConcept, Episode, Theme};
use crate::player::PlaybackState;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/episodes", get(get_episodes))
        .route("/api/episodes/latest", get(get_latest_episode))
        .route("/api/themes", get(get_themes))
        .route("/api/player", get(get_player_state))
        .route("/api/player/play", post(play))
        .route("/api/player/pause", post(pause))
        .route("/api/player/resume", post(resume))
        .route("/api/player/toggle", post(toggle_play_pause))
        .route("/api/player/stop", post(stop))
        .route("/api/player/seek", post(seek))
        .route("/api/player/skip-forward", post(skip_forward))
        .route("/api/player/skip-backward", post(skip_backward))
        .route("/api/player/volume", post(set_volume))
        .route("/api/player/next", post(play_next))
        .route("/api/player/previous", post(play_previous))
        .route("/api/bookmarks", get(get_bookmarks))
        .route("/api/bookmarks/:id/toggle", post(toggle_bookmark))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct EpisodesQuery {
    /// Optional theme filter, e.g. `?theme=Connection`.
    pub theme: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub position: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkipRequest {
    pub seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: f32,
}

/// Episode list for queue navigation; the frontend sends its current view.
#[derive(Debug, Deserialize)]
pub struct QueueRequest {
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkToggled {
    pub id: String,
    pub bookmarked: bool,
}

/// GET /api/episodes — the full fetched batch, newest first.
///
/// Ingestion failure is a 500 with `{"error": …}`; a feed that parses to
/// zero entries is an empty 200 array.
async fn get_episodes(
    State(state): State<AppState>,
    Query(query): Query<EpisodesQuery>,
) -> Result<Json<Vec<Episode>>, AppError> {
    let theme = query
        .theme
        .as_deref()
        .map(|raw| {
            Theme::parse(raw).ok_or_else(|| AppError::BadRequest(format!("unknown theme: {raw}")))
        })
        .transpose()?;

    let mut episodes = state.feed.try_fetch().await.map_err(|e| {
        tracing::error!("Error fetching thoughts: {}", e);
        AppError::Feed("Failed to fetch episodes".to_string())
    })?;

    if let Some(theme) = theme {
        episodes.retain(|e| e.theme == theme);
    }

    tracing::info!("get_episodes returning {} episodes", episodes.len());
    Ok(Json(episodes))
}

/// GET /api/episodes/latest
async fn get_latest_episode(State(state): State<AppState>) -> Result<Json<Episode>, AppError> {
    state
        .feed
        .latest()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no episodes available".to_string()))
}

/// GET /api/themes — the four Cs, in display order.
async fn get_themes() -> Json<Vec<CoreConcept>> {
    Json(core_concepts().to_vec())
}

/// GET /api/player — current transport snapshot.
async fn get_player_state(State(state): State<AppState>) -> Json<PlaybackState> {
    Json(state.player.state())
}

async fn play(State(state): State<AppState>, Json(episode): Json<Episode>) -> Json<PlaybackState> {
    state.player.play_episode(episode);
    Json(state.player.state())
}

async fn pause(State(state): State<AppState>) -> Json<PlaybackState> {
    state.player.pause();
    Json(state.player.state())
}

async fn resume(State(state): State<AppState>) -> Json<PlaybackState> {
    state.player.resume();
    Json(state.player.state())
}

async fn toggle_play_pause(State(state): State<AppState>) -> Json<PlaybackState> {
    state.player.toggle_play_pause();
    Json(state.player.state())
}

async fn stop(State(state): State<AppState>) -> Json<PlaybackState> {
    state.player.stop();
    Json(state.player.state())
}

async fn seek(
    State(state): State<AppState>,
    Json(request): Json<SeekRequest>,
) -> Json<PlaybackState> {
    state.player.seek(request.position);
    Json(state.player.state())
}

async fn skip_forward(
    State(state): State<AppState>,
    request: Option<Json<SkipRequest>>,
) -> Json<PlaybackState> {
    let seconds = request.and_then(|Json(r)| r.seconds);
    state.player.skip_forward(seconds);
    Json(state.player.state())
}

async fn skip_backward(
    State(state): State<AppState>,
    request: Option<Json<SkipRequest>>,
) -> Json<PlaybackState> {
    let seconds = request.and_then(|Json(r)| r.seconds);
    state.player.skip_backward(seconds);
    Json(state.player.state())
}

async fn set_volume(
    State(state): State<AppState>,
    Json(request): Json<VolumeRequest>,
) -> Json<PlaybackState> {
    state.player.set_volume(request.volume);
    Json(state.player.state())
}

async fn play_next(
    State(state): State<AppState>,
    Json(request): Json<QueueRequest>,
) -> Json<PlaybackState> {
    state.player.play_next(&request.episodes);
    Json(state.player.state())
}

async fn play_previous(
    State(state): State<AppState>,
    Json(request): Json<QueueRequest>,
) -> Json<PlaybackState> {
    state.player.play_previous(&request.episodes);
    Json(state.player.state())
}

/// GET /api/bookmarks — all bookmarked episode ids.
async fn get_bookmarks(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.bookmarks.ids())
}

/// POST /api/bookmarks/:id/toggle
async fn toggle_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookmarkToggled>, AppError> {
    let bookmarked = state.bookmarks.toggle(&id)?;
    tracing::info!("Bookmark {} -> {}", id, bookmarked);
    Ok(Json(BookmarkToggled { id, bookmarked }))
}
