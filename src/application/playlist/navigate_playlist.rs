use std::sync::Arc;

use crate::application::access::require_member;
use crate::application::SyncError;
use crate::domain::entities::{PlaylistDirection, PlaylistItem};
use crate::domain::repositories::RoomRepository;

/// Adjacent video lookup input
pub struct AdjacentVideoInput {
    pub room_id: String,
    pub user_id: String,
    pub current_position: i64,
    pub direction: PlaylistDirection,
}

/// Next / previous item relative to a position. No wraparound at either end.
pub struct GetAdjacentVideo<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetAdjacentVideo<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(
        &self,
        input: AdjacentVideoInput,
    ) -> Result<Option<PlaylistItem>, SyncError> {
        require_member(self.room_repo.as_ref(), &input.room_id, &input.user_id).await?;

        Ok(self
            .room_repo
            .find_adjacent_item(&input.room_id, input.current_position, input.direction)
            .await?)
    }
}

/// Head of the queue
pub struct GetCurrentVideo<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> GetCurrentVideo<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<PlaylistItem>, SyncError> {
        require_member(self.room_repo.as_ref(), room_id, user_id).await?;

        // Strictly after -1 is position 0
        Ok(self
            .room_repo
            .find_adjacent_item(room_id, -1, PlaylistDirection::Next)
            .await?)
    }
}

/// All items ascending by position
pub struct ListPlaylist<R: RoomRepository> {
    room_repo: Arc<R>,
}

impl<R: RoomRepository> ListPlaylist<R> {
    pub fn new(room_repo: Arc<R>) -> Self {
        Self { room_repo }
    }

    pub async fn execute(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Vec<PlaylistItem>, SyncError> {
        require_member(self.room_repo.as_ref(), room_id, user_id).await?;
        Ok(self.room_repo.list_playlist(room_id).await?)
    }
}
