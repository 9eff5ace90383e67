use std::sync::Arc;

use crate::application::access::{load_snapshot, require_room};
use crate::application::{RoomCommandLocks, RoomSnapshot, SyncError};
use crate::domain::entities::{Membership, Room, RoomRole};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::{JoinOutcome, RoomRepository};
use crate::domain::services::RoomBroadcaster;
use crate::infrastructure::auth::PasswordService;

/// Join room input
pub struct JoinRoomInput {
    pub room_id: String,
    pub user_id: String,
    pub password: Option<String>,
    pub request_id: Option<String>,
}

/// Join room output
#[derive(Debug)]
pub struct JoinRoomOutput {
    pub membership: Membership,
    pub snapshot: RoomSnapshot,
}

/// Join room use case
pub struct JoinRoom<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> JoinRoom<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: JoinRoomInput) -> Result<JoinRoomOutput, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        let room = require_room(self.room_repo.as_ref(), &input.room_id).await?;

        if self
            .room_repo
            .find_membership(&input.room_id, &input.user_id)
            .await?
            .is_some()
        {
            return Err(SyncError::AlreadyMember);
        }

        let member_count = self.room_repo.count_members(&input.room_id).await?;
        if room.is_full(member_count) {
            return Err(SyncError::RoomFull);
        }

        if !room.is_public {
            check_password(&room, input.password).await?;
        }

        // Capacity and uniqueness are re-checked inside the insert transaction
        let membership = Membership::new(input.room_id.clone(), input.user_id.clone(), RoomRole::Member);
        let (membership, member_count) =
            match self.room_repo.insert_member_with_capacity(&membership).await? {
                JoinOutcome::Joined {
                    membership,
                    member_count,
                } => (membership, member_count),
                JoinOutcome::RoomMissing => return Err(SyncError::room_not_found()),
                JoinOutcome::AlreadyMember => return Err(SyncError::AlreadyMember),
                JoinOutcome::Full => return Err(SyncError::RoomFull),
            };

        tracing::info!(
            "User {} joined room {} ({}/{})",
            input.user_id,
            input.room_id,
            member_count,
            room.max_members
        );

        // The join is durable from here on; announce it before any further read
        let event = RoomEvent::new(RoomEventKind::MemberJoined, &input.room_id)
            .with_origin(&input.user_id, input.request_id)
            .with_data(serde_json::json!({
                "member": membership,
                "memberCount": member_count,
            }));
        self.broadcaster.publish(event);

        let snapshot = load_snapshot(self.room_repo.as_ref(), &input.room_id).await?;

        Ok(JoinRoomOutput {
            membership,
            snapshot,
        })
    }
}

async fn check_password(room: &Room, candidate: Option<String>) -> Result<(), SyncError> {
    let candidate = candidate
        .filter(|p| !p.is_empty())
        .ok_or(SyncError::PasswordRequired)?;

    let Some(hash) = room.password_hash.clone() else {
        tracing::warn!("Private room {} has no password hash", room.id);
        return Err(SyncError::InvalidPassword);
    };

    match PasswordService::verify_blocking(candidate, hash).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(SyncError::InvalidPassword),
        Err(e) => {
            tracing::warn!("Password check failed for room {}: {}", room.id, e);
            Err(SyncError::InvalidPassword)
        }
    }
}
