use std::sync::Arc;

use crate::application::access::require_room;
use crate::application::{RoomCommandLocks, SyncError};
use crate::domain::events::{RoomEvent, RoomEventKind};
use crate::domain::repositories::{LeaveOutcome, RoomRepository};
use crate::domain::services::RoomBroadcaster;

/// Leave room input
pub struct LeaveRoomInput {
    pub room_id: String,
    pub user_id: String,
    pub request_id: Option<String>,
}

/// Leave room output
pub struct LeaveRoomOutput {
    /// Set when the leaving user was host and someone else took over
    pub new_host_id: Option<String>,
    /// Set when the leaving user was the last member
    pub room_deleted: bool,
}

/// Leave room use case
pub struct LeaveRoom<R: RoomRepository, B: RoomBroadcaster> {
    room_repo: Arc<R>,
    broadcaster: Arc<B>,
    locks: Arc<RoomCommandLocks>,
}

impl<R: RoomRepository, B: RoomBroadcaster> LeaveRoom<R, B> {
    pub fn new(room_repo: Arc<R>, broadcaster: Arc<B>, locks: Arc<RoomCommandLocks>) -> Self {
        Self {
            room_repo,
            broadcaster,
            locks,
        }
    }

    pub async fn execute(&self, input: LeaveRoomInput) -> Result<LeaveRoomOutput, SyncError> {
        let _guard = self.locks.acquire(&input.room_id).await;

        require_room(self.room_repo.as_ref(), &input.room_id).await?;

        let outcome = self
            .room_repo
            .remove_member(&input.room_id, &input.user_id)
            .await?;

        match outcome {
            LeaveOutcome::NotMember => Err(SyncError::NotFound("Membership".to_string())),
            LeaveOutcome::Left => {
                tracing::info!("User {} left room {}", input.user_id, input.room_id);

                let event = RoomEvent::new(RoomEventKind::MemberLeft, &input.room_id)
                    .with_origin(&input.user_id, input.request_id)
                    .with_data(serde_json::json!({ "userId": input.user_id }));
                self.broadcaster.publish(event);

                Ok(LeaveRoomOutput {
                    new_host_id: None,
                    room_deleted: false,
                })
            }
            LeaveOutcome::HostTransferred { new_host } => {
                tracing::info!(
                    "Host {} left room {}, {} is the new host",
                    input.user_id,
                    input.room_id,
                    new_host.user_id
                );

                let event = RoomEvent::new(RoomEventKind::MemberLeft, &input.room_id)
                    .with_action("hostTransferred")
                    .with_origin(&input.user_id, input.request_id)
                    .with_data(serde_json::json!({
                        "userId": input.user_id,
                        "newHostId": new_host.user_id,
                    }));
                self.broadcaster.publish(event);

                Ok(LeaveRoomOutput {
                    new_host_id: Some(new_host.user_id),
                    room_deleted: false,
                })
            }
            LeaveOutcome::RoomDeleted => {
                tracing::info!(
                    "Last member {} left room {}, room deleted",
                    input.user_id,
                    input.room_id
                );

                let event = RoomEvent::new(RoomEventKind::RoomClosed, &input.room_id)
                    .with_action("empty")
                    .with_origin(&input.user_id, input.request_id)
                    .with_data(serde_json::json!({ "userId": input.user_id }));
                self.broadcaster.publish(event);
                self.broadcaster.close_room(&input.room_id);

                Ok(LeaveRoomOutput {
                    new_host_id: None,
                    room_deleted: true,
                })
            }
        }
    }
}
