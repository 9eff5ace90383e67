use std::sync::Arc;

use uuid::Uuid;

use crate::application::SyncError;
use crate::domain::entities::{Membership, PlaybackState, Room, RoomRole};
use crate::domain::repositories::RoomRepository;
use crate::domain::value_objects::RoomSettings;
use crate::infrastructure::auth::PasswordService;

/// Create room input
pub struct CreateRoomInput {
    pub owner_id: String,
    pub settings: RoomSettings,
}

/// Create room output
pub struct CreateRoomOutput {
    pub room: Room,
    pub membership: Membership,
    pub playback: PlaybackState,
}

/// Create room use case
pub struct CreateRoom<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> CreateRoom<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: CreateRoomInput) -> Result<CreateRoomOutput, SyncError> {
        input.settings.validate()?;

        let password_hash = match input.settings.password.clone() {
            Some(password) => Some(
                PasswordService::hash_blocking(password)
                    .await
                    .map_err(|e| SyncError::Unavailable(e.to_string()))?,
            ),
            None => None,
        };

        let room = Room::new(
            Uuid::new_v4().to_string(),
            input.owner_id.clone(),
            &input.settings,
            password_hash,
        );
        let host = Membership::new(room.id.clone(), input.owner_id, RoomRole::Host);
        let playback = PlaybackState::new(room.id.clone());

        // Room, host seat and playback record land together or not at all
        let membership = self.room_repo.create_room(&room, &host, &playback).await?;

        tracing::info!(
            "Room {} created by {} ({})",
            room.id,
            membership.user_id,
            room.visibility().as_str()
        );

        Ok(CreateRoomOutput {
            room,
            membership,
            playback,
        })
    }
}
