use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::dto::{api_error, request_id, ApiError};
use crate::api::middleware::Claims;
use crate::api::AppState;
use crate::application::playback::{
    ChangeVideo, ChangeVideoInput, ControlPlayback, ControlPlaybackInput, PlaybackCommand,
    PlaybackSnapshot, RequestSync,
};

#[derive(Debug, Deserialize)]
pub struct TimeRequest {
    pub time: f64,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rate: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVideoRequest {
    pub video_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackResponse {
    pub success: bool,
    pub playback: PlaybackSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// GET /api/rooms/:roomId/playback - Authoritative state for a joining player
pub async fn get_playback(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let use_case = RequestSync::new(state.room_repo.clone());
    let playback = use_case
        .execute(&room_id, &claims.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(PlaybackResponse {
        success: true,
        playback,
        request_id: None,
    }))
}

async fn control(
    state: &AppState,
    room_id: String,
    user_id: String,
    headers: &HeaderMap,
    command: PlaybackCommand,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let request_id = request_id(headers);

    let use_case = ControlPlayback::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let playback = use_case
        .execute(ControlPlaybackInput {
            room_id,
            user_id,
            command,
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(PlaybackResponse {
        success: true,
        playback,
        request_id,
    }))
}

/// POST /api/rooms/:roomId/playback/play
pub async fn play(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TimeRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let command = PlaybackCommand::Play { at_time: body.time };
    control(&state, room_id, claims.user_id, &headers, command).await
}

/// POST /api/rooms/:roomId/playback/pause
pub async fn pause(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TimeRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let command = PlaybackCommand::Pause { at_time: body.time };
    control(&state, room_id, claims.user_id, &headers, command).await
}

/// POST /api/rooms/:roomId/playback/seek
pub async fn seek(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TimeRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let command = PlaybackCommand::Seek { at_time: body.time };
    control(&state, room_id, claims.user_id, &headers, command).await
}

/// POST /api/rooms/:roomId/playback/rate
pub async fn set_rate(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<RateRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let command = PlaybackCommand::SetRate { rate: body.rate };
    control(&state, room_id, claims.user_id, &headers, command).await
}

/// POST /api/rooms/:roomId/playback/video - Switch the current video
pub async fn change_video(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ChangeVideoRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let request_id = request_id(&headers);

    let use_case = ChangeVideo::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let playback = use_case
        .execute(ChangeVideoInput {
            room_id,
            user_id: claims.user_id,
            video_id: body.video_id,
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(PlaybackResponse {
        success: true,
        playback,
        request_id,
    }))
}
