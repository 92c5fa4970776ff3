use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    likes::{
        dto::{LikeRequest, UnlikeRequest},
        repo::{self, LikedTrack},
    },
    state::AppState,
    validate::require,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/like", post(like))
        .route("/unlike", post(unlike))
        .route("/liked-songs/:username", get(liked_songs))
}

#[instrument(skip(state, payload))]
pub async fn like(
    State(state): State<AppState>,
    Json(payload): Json<LikeRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let username = require(&payload.username, "username")?;
    let title = require(&payload.title, "title")?;
    let artist = require(&payload.artist, "artist")?;
    let link = require(&payload.link, "link")?;

    let id = repo::insert_like(&state.db, username, title, artist, link).await?;

    info!(id, username = %username, title = %title, "like recorded");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Like recorded", "id": id })),
    ))
}

#[instrument(skip(state, payload))]
pub async fn unlike(
    State(state): State<AppState>,
    Json(payload): Json<UnlikeRequest>,
) -> Result<Json<Value>, AppError> {
    let username = require(&payload.username, "username")?;
    let title = require(&payload.title, "title")?;
    let artist = require(&payload.artist, "artist")?;

    let affected = repo::delete_like(&state.db, username, title, artist).await?;
    if affected == 0 {
        warn!(username = %username, title = %title, "unlike matched no rows");
        return Err(AppError::NotFound(
            "No matching record found to delete".into(),
        ));
    }

    info!(username = %username, title = %title, "song unliked");
    Ok(Json(json!({ "message": "Song unliked successfully" })))
}

#[instrument(skip(state))]
pub async fn liked_songs(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<LikedTrack>>, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("username is required".into()));
    }

    let tracks = repo::list_by_username(&state.db, &username).await?;
    if tracks.is_empty() {
        return Err(AppError::NotFound(
            "No liked songs found for this user".into(),
        ));
    }

    Ok(Json(tracks))
}
