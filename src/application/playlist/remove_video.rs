use std::sync::Arc;

use crate::application::access::require_member;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::PlaylistItem;
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;

/// Remove video input
pub struct RemoveVideoInput {
    pub room_id: String,
    pub item_id: String,
    pub user_id: String,
    pub request_id: Option<String>,
}

/// Remove a playlist item and close the gap it leaves
pub struct RemoveVideo<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> RemoveVideo<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: RemoveVideoInput) -> Result<PlaylistItem, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        let item = self
            .room_repo
            .find_playlist_item(&input.item_id)
            .await?
            .ok_or_else(|| SyncError::NotFound("Playlist item".to_string()))?;
        if item.room_id != input.room_id {
            return Err(SyncError::InvalidRequest(
                "Playlist item does not belong to this room".to_string(),
            ));
        }

        // Delete and compaction commit together
        let removed = self
            .room_repo
            .remove_playlist_item(&input.room_id, &input.item_id)
            .await?
            .ok_or_else(|| SyncError::NotFound("Playlist item".to_string()))?;

        tracing::info!(
            "Removed item {} at position {} from room {}",
            removed.id,
            removed.position,
            input.room_id
        );

        let event = RoomEvent::new(RoomEventKind::PlaylistItemRemoved, &input.room_id)
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({
                "itemId": removed.id,
                "position": removed.position,
            }));
        self.broadcaster.publish(event);

        Ok(removed)
    }
}
