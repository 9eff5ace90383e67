use std::sync::Arc;

use uuid::Uuid;

use crate::application::access::require_member;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::{NewPlaylistItem, PlaylistItem};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;
use crate::domain::value_objects::VideoSpec;

/// Add video input
pub struct AddVideoInput {
    pub room_id: String,
    pub user_id: String,
    pub video: VideoSpec,
    pub request_id: Option<String>,
}

/// Append a video at the end of the room's playlist
pub struct AddVideo<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> AddVideo<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: AddVideoInput) -> Result<PlaylistItem, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        input
            .video
            .validate()
            .map_err(|msg| SyncError::InvalidRequest(msg.to_string()))?;

        let item = NewPlaylistItem::new(
            Uuid::new_v4().to_string(),
            input.room_id.clone(),
            input.user_id.clone(),
            input.video,
        );
        let item = self.room_repo.append_playlist_item(item).await?;

        tracing::info!(
            "Video {} queued at position {} in room {}",
            item.video_id,
            item.position,
            item.room_id
        );

        let event = RoomEvent::new(RoomEventKind::PlaylistItemAdded, &input.room_id)
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({ "item": item }));
        self.broadcaster.publish(event);

        Ok(item)
    }
}
