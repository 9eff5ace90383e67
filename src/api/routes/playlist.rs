use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::dto::{api_error, request_id, ApiError};
use crate::api::middleware::Claims;
use crate::api::AppState;
use crate::application::playback::{ChangeVideo, PlayAdjacentInput, PlaybackSnapshot};
use crate::application::playlist::{
    AddVideo, AddVideoInput, AdjacentVideoInput, GetAdjacentVideo, GetCurrentVideo,
    ListPlaylist, RemoveVideo, RemoveVideoInput, ReorderPlaylist, ReorderPlaylistInput,
};
use crate::domain::entities::{PlaylistDirection, PlaylistItem};
use crate::domain::value_objects::VideoSpec;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoRequest {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub new_position: i64,
}

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayAdjacentRequest {
    pub current_position: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub success: bool,
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub success: bool,
    pub item: PlaylistItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionalItemResponse {
    pub success: bool,
    pub item: Option<PlaylistItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderResponse {
    pub success: bool,
    pub item: PlaylistItem,
    pub moved: bool,
    pub items: Vec<PlaylistItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayAdjacentResponse {
    pub success: bool,
    /// False at either end of the queue
    pub changed: bool,
    pub item: Option<PlaylistItem>,
    pub playback: Option<PlaybackSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/rooms/:roomId/playlist
pub async fn list_playlist(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<PlaylistResponse>, ApiError> {
    let use_case = ListPlaylist::new(state.room_repo.clone());
    let items = use_case
        .execute(&room_id, &claims.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(PlaylistResponse {
        success: true,
        items,
    }))
}

/// POST /api/rooms/:roomId/playlist - Append a video
pub async fn add_video(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AddVideoRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let request_id = request_id(&headers);

    let use_case = AddVideo::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let item = use_case
        .execute(AddVideoInput {
            room_id,
            user_id: claims.user_id.clone(),
            video: VideoSpec {
                video_id: body.video_id,
                title: body.title,
                thumbnail: body.thumbnail,
                duration: body.duration.unwrap_or(0),
            },
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            success: true,
            item,
            request_id,
        }),
    ))
}

/// DELETE /api/rooms/:roomId/playlist/items/:itemId
pub async fn remove_video(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((room_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ItemResponse>, ApiError> {
    let request_id = request_id(&headers);

    let use_case = RemoveVideo::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let item = use_case
        .execute(RemoveVideoInput {
            room_id,
            item_id,
            user_id: claims.user_id.clone(),
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(ItemResponse {
        success: true,
        item,
        request_id,
    }))
}

/// PATCH /api/rooms/:roomId/playlist/items/:itemId/position
pub async fn reorder_playlist(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((room_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>, ApiError> {
    let request_id = request_id(&headers);

    let use_case = ReorderPlaylist::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let result = use_case
        .execute(ReorderPlaylistInput {
            room_id,
            item_id,
            new_position: body.new_position,
            user_id: claims.user_id.clone(),
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(ReorderResponse {
        success: true,
        item: result.item,
        moved: result.moved,
        items: result.playlist,
        request_id,
    }))
}

/// GET /api/rooms/:roomId/playlist/current - Head of the queue
pub async fn current_video(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<OptionalItemResponse>, ApiError> {
    let use_case = GetCurrentVideo::new(state.room_repo.clone());
    let item = use_case
        .execute(&room_id, &claims.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(OptionalItemResponse {
        success: true,
        item,
    }))
}

async fn adjacent_video(
    state: &AppState,
    room_id: String,
    user_id: String,
    current_position: i64,
    direction: PlaylistDirection,
) -> Result<Json<OptionalItemResponse>, ApiError> {
    let use_case = GetAdjacentVideo::new(state.room_repo.clone());
    let item = use_case
        .execute(AdjacentVideoInput {
            room_id,
            user_id,
            current_position,
            direction,
        })
        .await
        .map_err(api_error)?;

    Ok(Json(OptionalItemResponse {
        success: true,
        item,
    }))
}

/// GET /api/rooms/:roomId/playlist/next?position=N
pub async fn next_video(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<OptionalItemResponse>, ApiError> {
    adjacent_video(
        &state,
        room_id,
        claims.user_id,
        query.position.unwrap_or(-1),
        PlaylistDirection::Next,
    )
    .await
}

/// GET /api/rooms/:roomId/playlist/previous?position=N
pub async fn previous_video(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<OptionalItemResponse>, ApiError> {
    adjacent_video(
        &state,
        room_id,
        claims.user_id,
        query.position.unwrap_or(0),
        PlaylistDirection::Previous,
    )
    .await
}

async fn play_adjacent(
    state: &AppState,
    room_id: String,
    user_id: String,
    headers: &HeaderMap,
    current_position: i64,
    direction: PlaylistDirection,
) -> Result<Json<PlayAdjacentResponse>, ApiError> {
    let request_id = request_id(headers);

    let use_case = ChangeVideo::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let result = use_case
        .play_adjacent(PlayAdjacentInput {
            room_id,
            user_id,
            current_position,
            direction,
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    let (item, playback) = match result {
        Some(out) => (Some(out.item), Some(out.playback)),
        None => (None, None),
    };

    Ok(Json(PlayAdjacentResponse {
        success: true,
        changed: item.is_some(),
        item,
        playback,
        request_id,
    }))
}

/// POST /api/rooms/:roomId/playlist/play-next
pub async fn play_next(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<PlayAdjacentRequest>,
) -> Result<Json<PlayAdjacentResponse>, ApiError> {
    play_adjacent(
        &state,
        room_id,
        claims.user_id,
        &headers,
        body.current_position,
        PlaylistDirection::Next,
    )
    .await
}

/// POST /api/rooms/:roomId/playlist/play-previous
pub async fn play_previous(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<PlayAdjacentRequest>,
) -> Result<Json<PlayAdjacentResponse>, ApiError> {
    play_adjacent(
        &state,
        room_id,
        claims.user_id,
        &headers,
        body.current_position,
        PlaylistDirection::Previous,
    )
    .await
}
