use std::sync::Arc;

use crate::application::access::require_room;
use crate::application::SyncError;
use crate::domain::entities::{Membership, Room};
use crate::domain::repositories::RoomRepository;

/// Get room input
pub struct GetRoomInput {
    pub room_id: String,
    /// Requester, if authenticated
    pub user_id: Option<String>,
}

/// Get room output
pub struct GetRoomOutput {
    pub room: Room,
    pub member_count: usize,
    /// Requester's own seat, if any
    pub membership: Option<Membership>,
    /// Member list; only disclosed to members
    pub members: Option<Vec<Membership>>,
}

/// Get room details use case
pub struct GetRoom<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetRoom<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: GetRoomInput) -> Result<GetRoomOutput, SyncError> {
        let room = require_room(self.room_repo.as_ref(), &input.room_id).await?;

        let membership = match input.user_id.as_deref() {
            Some(user_id) => self.room_repo.find_membership(&room.id, user_id).await?,
            None => None,
        };

        let (member_count, members) = if membership.is_some() {
            let members = self.room_repo.list_members(&room.id).await?;
            (members.len(), Some(members))
        } else {
            (self.room_repo.count_members(&room.id).await?, None)
        };

        Ok(GetRoomOutput {
            room,
            member_count,
            membership,
            members,
        })
    }
}
