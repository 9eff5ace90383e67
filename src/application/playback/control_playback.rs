use std::sync::Arc;

use crate::application::access::require_member;
use crate::application::playback::PlaybackSnapshot;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::{validate_rate, validate_time, PlaybackState};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;

/// Transport command applied to the room clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Play { at_time: f64 },
    Pause { at_time: f64 },
    /// Keeps the playing flag
    Seek { at_time: f64 },
    SetRate { rate: f64 },
}

impl PlaybackCommand {
    pub fn action(&self) -> &'static str {
        match self {
            PlaybackCommand::Play { .. } => "play",
            PlaybackCommand::Pause { .. } => "pause",
            PlaybackCommand::Seek { .. } => "seek",
            PlaybackCommand::SetRate { .. } => "rate",
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        match *self {
            PlaybackCommand::Play { at_time }
            | PlaybackCommand::Pause { at_time }
            | PlaybackCommand::Seek { at_time } => validate_time(at_time),
            PlaybackCommand::SetRate { rate } => validate_rate(rate),
        }
    }

    fn apply(&self, state: &mut PlaybackState, now_ms: i64) {
        match *self {
            PlaybackCommand::Play { at_time } => state.play(at_time, now_ms),
            PlaybackCommand::Pause { at_time } => state.pause(at_time, now_ms),
            PlaybackCommand::Seek { at_time } => state.seek(at_time, now_ms),
            PlaybackCommand::SetRate { rate } => state.set_rate(rate, now_ms),
        }
    }
}

/// Control playback input
pub struct ControlPlaybackInput {
    pub room_id: String,
    pub user_id: String,
    pub command: PlaybackCommand,
    pub request_id: Option<String>,
}

/// Play, pause, seek and rate changes. Concurrent commands on one room apply
/// in lock order, the last one wins.
pub struct ControlPlayback<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> ControlPlayback<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: ControlPlaybackInput) -> Result<PlaybackSnapshot, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        input
            .command
            .validate()
            .map_err(|msg| SyncError::InvalidRequest(msg.to_string()))?;

        let mut state = self
            .room_repo
            .get_playback(&input.room_id)
            .await?
            .ok_or_else(|| SyncError::NotFound("Playback state".to_string()))?;

        let now = chrono::Utc::now().timestamp_millis();
        input.command.apply(&mut state, now);

        // Single-row write: clock, flag and rate change together
        self.room_repo.save_playback(&state).await?;

        tracing::info!(
            "Playback {} in room {} by {} at {:.2}s",
            input.command.action(),
            input.room_id,
            input.user_id,
            state.elapsed_seconds
        );

        let snapshot = PlaybackSnapshot::at(state, now);

        let event = RoomEvent::new(RoomEventKind::VideoStateChanged, &input.room_id)
            .with_action(input.command.action())
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({ "playback": snapshot }));
        self.broadcaster.publish(event);

        Ok(snapshot)
    }
}
