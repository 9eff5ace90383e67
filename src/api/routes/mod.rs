pub mod health;
pub mod playback;
pub mod playlist;
pub mod rooms;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::api::middleware::{auth_middleware, optional_auth_middleware};
use crate::api::sse;
use crate::api::AppState;

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/rooms", create_rooms_router(state.clone()))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Create rooms router: membership, playlist, playback and the event stream
fn create_rooms_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let auth = || middleware::from_fn_with_state(state.clone(), auth_middleware);
    let optional_auth = || middleware::from_fn_with_state(state.clone(), optional_auth_middleware);

    Router::new()
        // Public routes (optional auth)
        .route("/", get(rooms::list_rooms).layer(optional_auth()))
        .route("/:roomId", get(rooms::get_room).layer(optional_auth()))
        // Event stream authenticates with a query token
        .route("/:roomId/events", get(sse::room_events_handler))
        // Membership
        .route("/", post(rooms::create_room).layer(auth()))
        .route("/:roomId", patch(rooms::update_room).layer(auth()))
        .route("/:roomId", delete(rooms::delete_room).layer(auth()))
        .route("/:roomId/join", post(rooms::join_room).layer(auth()))
        .route("/:roomId/leave", post(rooms::leave_room).layer(auth()))
        .route("/:roomId/members", get(rooms::list_members).layer(auth()))
        .route(
            "/:roomId/members/:userId/role",
            patch(rooms::update_member_role).layer(auth()),
        )
        // Playlist
        .route("/:roomId/playlist", get(playlist::list_playlist).layer(auth()))
        .route("/:roomId/playlist", post(playlist::add_video).layer(auth()))
        .route(
            "/:roomId/playlist/current",
            get(playlist::current_video).layer(auth()),
        )
        .route("/:roomId/playlist/next", get(playlist::next_video).layer(auth()))
        .route(
            "/:roomId/playlist/previous",
            get(playlist::previous_video).layer(auth()),
        )
        .route(
            "/:roomId/playlist/play-next",
            post(playlist::play_next).layer(auth()),
        )
        .route(
            "/:roomId/playlist/play-previous",
            post(playlist::play_previous).layer(auth()),
        )
        .route(
            "/:roomId/playlist/items/:itemId",
            delete(playlist::remove_video).layer(auth()),
        )
        .route(
            "/:roomId/playlist/items/:itemId/position",
            patch(playlist::reorder_playlist).layer(auth()),
        )
        // Playback
        .route("/:roomId/playback", get(playback::get_playback).layer(auth()))
        .route("/:roomId/playback/play", post(playback::play).layer(auth()))
        .route("/:roomId/playback/pause", post(playback::pause).layer(auth()))
        .route("/:roomId/playback/seek", post(playback::seek).layer(auth()))
        .route("/:roomId/playback/rate", post(playback::set_rate).layer(auth()))
        .route(
            "/:roomId/playback/video",
            post(playback::change_video).layer(auth()),
        )
        .with_state(state)
}
