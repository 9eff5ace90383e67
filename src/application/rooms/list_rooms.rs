use std::sync::Arc;

use crate::application::SyncError;
use crate::domain::entities::RoomWithMemberCount;
use crate::domain::repositories::RoomRepository;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// List public rooms input
pub struct ListRoomsInput {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// List public rooms output
pub struct ListRoomsOutput {
    pub rooms: Vec<RoomWithMemberCount>,
    pub limit: u32,
    pub offset: u32,
}

/// List public rooms use case
pub struct ListPublicRooms<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> ListPublicRooms<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(&self, input: ListRoomsInput) -> Result<ListRoomsOutput, SyncError> {
        let limit = input.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = input.offset.unwrap_or(0);

        let rooms = self.room_repo.find_public_rooms(limit, offset).await?;

        Ok(ListRoomsOutput {
            rooms,
            limit,
            offset,
        })
    }
}
