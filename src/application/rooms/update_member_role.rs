use std::sync::Arc;

use crate::application::access::require_room;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::{Membership, RoomRole};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;

/// Update member role input
pub struct UpdateMemberRoleInput {
    pub room_id: String,
    pub requester_id: String,
    pub target_user_id: String,
    pub role: RoomRole,
    pub request_id: Option<String>,
}

/// Change a member's role. Host only; hosting itself only moves through leave failover.
pub struct UpdateMemberRole<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> UpdateMemberRole<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: UpdateMemberRoleInput) -> Result<Membership, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_room(self.room_repo.as_ref(), &input.room_id).await?;

        let requester_is_host = self
            .room_repo
            .find_membership(&input.room_id, &input.requester_id)
            .await?
            .is_some_and(|m| m.is_host());
        if !requester_is_host {
            return Err(SyncError::Forbidden(
                "Only the host can change member roles".to_string(),
            ));
        }

        let target = self
            .room_repo
            .find_membership(&input.room_id, &input.target_user_id)
            .await?
            .ok_or_else(|| SyncError::NotFound("Member".to_string()))?;

        if input.role == RoomRole::Host {
            return Err(SyncError::InvalidConfig(
                "Host role cannot be assigned directly".to_string(),
            ));
        }
        if target.is_host() {
            return Err(SyncError::InvalidConfig(
                "The host cannot change their own role".to_string(),
            ));
        }

        let updated = self
            .room_repo
            .update_member_role(&input.room_id, &input.target_user_id, input.role)
            .await?
            .ok_or_else(|| SyncError::NotFound("Member".to_string()))?;

        tracing::info!(
            "User {} is now {} in room {}",
            updated.user_id,
            updated.role.as_str(),
            input.room_id
        );

        let event = RoomEvent::new(RoomEventKind::RoomUpdated, &input.room_id)
            .with_action("memberRoleChanged")
            .with_origin(&input.requester_id, input.request_id)
            .with_data(serde_json::json!({
                "userId": updated.user_id,
                "role": updated.role,
            }));
        self.broadcaster.publish(event);

        Ok(updated)
    }
}
