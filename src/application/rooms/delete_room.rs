use std::sync::Arc;

use crate::application::access::require_room;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;

/// Delete room input
pub struct DeleteRoomInput {
    pub room_id: String,
    pub user_id: String,
    pub request_id: Option<String>,
}

/// Delete room output
pub struct DeleteRoomOutput {
    pub room_id: String,
    pub room_name: String,
}

/// Delete room use case (host only)
pub struct DeleteRoom<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> DeleteRoom<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: DeleteRoomInput) -> Result<DeleteRoomOutput, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        let room = require_room(self.room_repo.as_ref(), &input.room_id).await?;

        let is_host = self
            .room_repo
            .find_membership(&input.room_id, &input.user_id)
            .await?
            .is_some_and(|m| m.is_host());
        if !is_host {
            return Err(SyncError::Forbidden(
                "Only the host can delete this room".to_string(),
            ));
        }

        if !self.room_repo.delete_room(&input.room_id).await? {
            return Err(SyncError::room_not_found());
        }

        tracing::info!("Room {} deleted by host {}", input.room_id, input.user_id);

        let event = RoomEvent::new(RoomEventKind::RoomClosed, &input.room_id)
            .with_action("deleted")
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({ "roomName": room.name }));
        self.broadcaster.publish(event);
        self.broadcaster.close_room(&input.room_id);

        Ok(DeleteRoomOutput {
            room_id: room.id,
            room_name: room.name,
        })
    }
}
