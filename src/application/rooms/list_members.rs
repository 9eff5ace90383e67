use std::sync::Arc;

use crate::application::access::require_room;
use crate::application::SyncError;
use crate::domain::entities::Membership;
use crate::domain::repositories::RoomRepository;

/// Members ordered host first, then moderators, then members, each by join order
pub struct ListMembers<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> ListMembers<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, room_id: &str) -> Result<Vec<Membership>, SyncError> {
        require_room(self.room_repo.as_ref(), room_id).await?;
        Ok(self.room_repo.list_members(room_id).await?)
    }
}
