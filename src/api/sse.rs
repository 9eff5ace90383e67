use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_broadcast::RecvError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;

use crate::api::dto::{api_error, error_response, ApiError};
use crate::application::playback::RequestSync;
use crate::domain::events::RoomEventKind;
use crate::domain::services::{ConnectionId, RoomBroadcaster};
use crate::infrastructure::app_state::AppState;
use crate::infrastructure::services::RoomHub;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Deserialize)]
pub struct SseParams {
    token: Option<String>,
}

/// Detaches the connection from its room when the stream is dropped
struct SubscriptionGuard {
    hub: Arc<RoomHub>,
    room_id: String,
    connection_id: ConnectionId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.unsubscribe(&self.room_id, self.connection_id);
    }
}

/// GET /api/rooms/:roomId/events?token=... - Live room events for a member
pub async fn room_events_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(params): Query<SseParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // EventSource cannot set headers, so the token travels in the query string
    let claims = params
        .token
        .as_deref()
        .and_then(|token| state.jwt_service.verify(token).ok())
        .ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid token",
            )
        })?;

    // Subscribe before the snapshot so nothing committed in between is missed
    let hub = state.room_hub.clone();
    let connection_id = hub.next_connection_id();
    let mut receiver = hub.subscribe(&room_id, connection_id, &claims.user_id);
    let guard = SubscriptionGuard {
        hub,
        room_id: room_id.clone(),
        connection_id,
    };

    // Membership check doubles as the initial sync payload; a failure drops the guard
    let playback = RequestSync::new(state.room_repo.clone())
        .execute(&room_id, &claims.user_id)
        .await
        .map_err(api_error)?;
    let user_id = claims.user_id;

    let stream = async_stream::stream! {
        let _guard = guard;
        tracing::debug!("SSE stream {} started for user {} in room {}", connection_id, user_id, room_id);

        yield Ok(Event::default()
            .event("connected")
            .data(serde_json::json!({
                "roomId": room_id,
                "connectionId": connection_id,
                "playback": playback,
                "timestamp": chrono::Utc::now().timestamp_millis()
            }).to_string()));

        let mut heartbeat_interval = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            tokio::select! {
                _ = heartbeat_interval.tick() => {
                    yield Ok(Event::default().comment("heartbeat"));
                }
                result = receiver.recv() => {
                    match result {
                        Ok(event) => {
                            let own_leave = event.kind == RoomEventKind::MemberLeft
                                && event.origin.as_ref().is_some_and(|o| o.user_id == user_id);
                            let json = serde_json::to_string(&event).unwrap_or_default();
                            yield Ok(Event::default()
                                .event(event.kind.as_str())
                                .data(json));
                            if own_leave {
                                break;
                            }
                        }
                        Err(RecvError::Overflowed(missed)) => {
                            tracing::debug!("SSE stream {} lagged, {} events dropped", connection_id, missed);
                            // Client should resync with a fresh snapshot
                            yield Ok(Event::default()
                                .event("lagged")
                                .data(serde_json::json!({ "missed": missed }).to_string()));
                        }
                        Err(RecvError::Closed) => {
                            tracing::debug!("Room channel {} closed, ending SSE stream {}", room_id, connection_id);
                            break;
                        }
                    }
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
