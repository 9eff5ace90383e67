use std::sync::Arc;

use crate::application::access::require_member;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::entities::Room;
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::RoomRepository;
use crate::domain::services::RoomBroadcaster;
use crate::domain::value_objects::{RoomPatch, SettingsError};
use crate::infrastructure::auth::PasswordService;

/// Update room input
pub struct UpdateRoomInput {
    pub room_id: String,
    pub user_id: String,
    pub patch: RoomPatch,
    pub request_id: Option<String>,
}

/// Update room output
pub struct UpdateRoomOutput {
    pub room: Room,
    /// False when the patch was empty and nothing was written
    pub changed: bool,
}

/// Update room settings (host or moderator)
pub struct UpdateRoom<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> UpdateRoom<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: UpdateRoomInput) -> Result<UpdateRoomOutput, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        let (mut room, membership) =
            require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        if !membership.role.can_update_room() {
            return Err(SyncError::Forbidden(
                "Only the host or moderators can update this room".to_string(),
            ));
        }

        input.patch.validate()?;
        if input.patch.is_empty() {
            return Ok(UpdateRoomOutput {
                room,
                changed: false,
            });
        }

        let patch = input.patch;

        if let Some(max_members) = patch.max_members {
            let member_count = self.room_repo.count_members(&room.id).await?;
            if (max_members as usize) < member_count {
                return Err(SyncError::InvalidRequest(format!(
                    "Room already has {} members",
                    member_count
                )));
            }
            room.max_members = max_members;
        }

        if let Some(name) = patch.name {
            room.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            room.description = Some(description).filter(|d| !d.is_empty());
        }
        if let Some(password) = patch.password {
            room.password_hash = Some(
                PasswordService::hash_blocking(password)
                    .await
                    .map_err(|e| SyncError::Unavailable(e.to_string()))?,
            );
        }
        if let Some(is_public) = patch.is_public {
            room.is_public = is_public;
        }

        // Going private requires either a new password or one already on file
        if !room.is_consistent() {
            return Err(SettingsError::MissingPassword.into());
        }

        room.touch();
        self.room_repo.update_room(&room).await?;

        tracing::info!("Room {} updated by {}", room.id, input.user_id);

        let event = RoomEvent::new(RoomEventKind::RoomUpdated, &room.id)
            .with_action("settingsChanged")
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({
                "room": room,
                "hasPassword": room.has_password(),
            }));
        self.broadcaster.publish(event);

        Ok(UpdateRoomOutput {
            room,
            changed: true,
        })
    }
}
