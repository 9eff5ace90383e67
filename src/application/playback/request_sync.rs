use std::sync::Arc;

use serde::Serialize;

use crate::application::access::require_member;
use crate::application::SyncError;
use crate::domain::entities::PlaybackState;
use crate::domain::repositories::RoomRepository;

/// Stored playback state plus the server's projection of it at `server_time`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    #[serde(flatten)]
    pub state: PlaybackState,
    /// Live position in seconds at `server_time`
    pub position: f64,
    /// Unix millis
    pub server_time: i64,
}

impl PlaybackSnapshot {
    pub fn at(state: PlaybackState, now_ms: i64) -> Self {
        Self {
            position: state.position_at(now_ms),
            server_time: now_ms,
            state,
        }
    }

    pub fn now(state: PlaybackState) -> Self {
        Self::at(state, chrono::Utc::now().timestamp_millis())
    }
}

/// One-off read of the authoritative state for a (re)initializing player.
/// The answer goes to the requester only.
pub struct RequestSync<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> RequestSync<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, room_id: &str, user_id: &str) -> Result<PlaybackSnapshot, SyncError> {
        require_member(self.room_repo.as_ref(), room_id, user_id).await?;

        let state = self
            .room_repo
            .get_playback(room_id)
            .await?
            .ok_or_else(|| SyncError::NotFound("Playback state".to_string()))?;

        Ok(PlaybackSnapshot::now(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_projects_running_clock() {
        let mut state = PlaybackState::new("room".into());
        state.play(10.0, 1_000);

        let snapshot = PlaybackSnapshot::at(state, 3_000);
        assert_eq!(snapshot.position, 12.0);
        assert_eq!(snapshot.server_time, 3_000);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["elapsedSeconds"], 10.0);
        assert_eq!(json["isPlaying"], true);
        assert_eq!(json["position"], 12.0);
    }
}
