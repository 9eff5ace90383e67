use std::sync::Arc;

use crate::application::access::require_member;
use crate::application::playback::PlaybackSnapshot;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::{PlaylistDirection, PlaylistItem};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;

/// Change video input
pub struct ChangeVideoInput {
    pub room_id: String,
    pub user_id: String,
    pub video_id: String,
    pub request_id: Option<String>,
}

/// Play adjacent input
pub struct PlayAdjacentInput {
    pub room_id: String,
    pub user_id: String,
    pub current_position: i64,
    pub direction: PlaylistDirection,
    pub request_id: Option<String>,
}

/// Result of stepping through the queue
pub struct PlayAdjacentOutput {
    pub item: PlaylistItem,
    pub playback: PlaybackSnapshot,
}

/// Select a video: clock back to zero, paused. Emits `video-changed` so
/// clients rebuild their player instead of seeking the old one.
pub struct ChangeVideo<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> ChangeVideo<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: ChangeVideoInput) -> Result<PlaybackSnapshot, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        if input.video_id.trim().is_empty() {
            return Err(SyncError::InvalidRequest("Video id is required".to_string()));
        }

        self.switch_to(
            &input.room_id,
            &input.user_id,
            input.video_id,
            "changeVideo",
            input.request_id,
            None,
        )
        .await
    }

    /// Step to the next or previous queued item. At either end of the queue
    /// nothing changes and `None` is returned.
    pub async fn play_adjacent(
        &self,
        input: PlayAdjacentInput,
    ) -> Result<Option<PlayAdjacentOutput>, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        let Some(item) = self
            .room_repo
            .find_adjacent_item(&input.room_id, input.current_position, input.direction)
            .await?
        else {
            return Ok(None);
        };

        let action = match input.direction {
            PlaylistDirection::Next => "playNext",
            PlaylistDirection::Previous => "playPrevious",
        };

        let playback = self
            .switch_to(
                &input.room_id,
                &input.user_id,
                item.video_id.clone(),
                action,
                input.request_id,
                Some(&item),
            )
            .await?;

        Ok(Some(PlayAdjacentOutput { item, playback }))
    }

    /// Caller holds the room lock and has checked membership
    async fn switch_to(
        &self,
        room_id: &str,
        user_id: &str,
        video_id: String,
        action: &str,
        request_id: Option<String>,
        item: Option<&PlaylistItem>,
    ) -> Result<PlaybackSnapshot, SyncError> {
        let mut state = self
            .room_repo
            .get_playback(room_id)
            .await?
            .ok_or_else(|| SyncError::NotFound("Playback state".to_string()))?;

        let now = chrono::Utc::now().timestamp_millis();
        state.change_video(video_id, now);
        self.room_repo.save_playback(&state).await?;

        tracing::info!(
            "Room {} switched to video {:?} ({}) by {}",
            room_id,
            state.video_id,
            action,
            user_id
        );

        let snapshot = PlaybackSnapshot::at(state, now);

        let event = RoomEvent::new(RoomEventKind::VideoChanged, room_id)
            .with_action(action)
            .with_origin(user_id, request_id)
            .with_data(serde_json::json!({
                "playback": snapshot,
                "item": item,
            }));
        self.broadcaster.publish(event);

        Ok(snapshot)
    }
}
