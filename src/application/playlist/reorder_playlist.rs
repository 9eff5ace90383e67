use std::sync::Arc;

use crate::application::access::require_member;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::{MoveOutcome, PlaylistItem};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;

/// Reorder playlist input
pub struct ReorderPlaylistInput {
    pub room_id: String,
    pub item_id: String,
    /// Target zero-based position, validated against the count at commit time
    pub new_position: i64,
    pub user_id: String,
    pub request_id: Option<String>,
}

/// Reorder playlist output
pub struct ReorderPlaylistOutput {
    pub item: PlaylistItem,
    /// False when the item was already at the requested position
    pub moved: bool,
    /// Full ordered playlist after the move; empty when nothing moved
    pub playlist: Vec<PlaylistItem>,
}

/// Move one item, shifting the ones in between
pub struct ReorderPlaylist<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> ReorderPlaylist<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(
        &self,
        input: ReorderPlaylistInput,
    ) -> Result<ReorderPlaylistOutput, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        let outcome = self
            .room_repo
            .move_playlist_item(&input.room_id, &input.item_id, input.new_position)
            .await?;

        let (item, playlist) = match outcome {
            MoveOutcome::Moved { item, playlist } => (item, playlist),
            MoveOutcome::Unchanged(item) => {
                return Ok(ReorderPlaylistOutput {
                    item,
                    moved: false,
                    playlist: Vec::new(),
                })
            }
            MoveOutcome::OutOfRange { count } => {
                return Err(SyncError::InvalidRequest(format!(
                    "Position {} is out of range, playlist has {} items",
                    input.new_position, count
                )))
            }
            MoveOutcome::Missing => {
                return Err(SyncError::NotFound("Playlist item".to_string()))
            }
            MoveOutcome::WrongRoom => {
                return Err(SyncError::InvalidRequest(
                    "Playlist item does not belong to this room".to_string(),
                ))
            }
        };

        tracing::info!(
            "Moved item {} to position {} in room {}",
            item.id,
            item.position,
            input.room_id
        );

        let event = RoomEvent::new(RoomEventKind::PlaylistUpdated, &input.room_id)
            .with_action("reordered")
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({
                "movedItemId": item.id,
                "items": playlist,
            }));
        self.broadcaster.publish(event);

        Ok(ReorderPlaylistOutput {
            item,
            moved: true,
            playlist,
        })
    }
}
