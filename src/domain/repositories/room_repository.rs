use async_trait::async_trait;

use crate::domain::entities::{
    Membership, MoveOutcome, NewPlaylistItem, PlaybackState, PlaylistDirection, PlaylistItem,
    Room, RoomRole, RoomWithMemberCount,
};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Transaction lost a race with a concurrent writer; safe to retry
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// Result of an atomic capacity-checked join
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// Row inserted; `member_count` is read inside the same transaction
    Joined {
        membership: Membership,
        member_count: usize,
    },
    RoomMissing,
    AlreadyMember,
    Full,
}

/// Result of an atomic leave with host failover
#[derive(Debug, Clone)]
pub enum LeaveOutcome {
    NotMember,
    /// Plain member row removed
    Left,
    /// Old host row removed and the earliest remaining member promoted
    HostTransferred { new_host: Membership },
    /// Last member left; room and all dependents removed
    RoomDeleted,
}

/// Storage for the room aggregate: room, memberships, playlist and playback.
///
/// Every method is one transaction. Multi-row methods must be all-or-nothing.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    // ========== Room operations ==========

    /// Find room by ID
    async fn find_room(&self, id: &str) -> Result<Option<Room>, RepositoryError>;

    /// Public rooms with member counts, newest first
    async fn find_public_rooms(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RoomWithMemberCount>, RepositoryError>;

    /// Insert room, host membership and playback state together
    async fn create_room(
        &self,
        room: &Room,
        host: &Membership,
        playback: &PlaybackState,
    ) -> Result<Membership, RepositoryError>;

    /// Overwrite room columns
    async fn update_room(&self, room: &Room) -> Result<(), RepositoryError>;

    /// Delete room and every dependent row. Returns false if it did not exist.
    async fn delete_room(&self, id: &str) -> Result<bool, RepositoryError>;

    // ========== Membership operations ==========

    async fn find_membership(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, RepositoryError>;

    /// Members ordered by role (host, moderator, member) then join order
    async fn list_members(&self, room_id: &str) -> Result<Vec<Membership>, RepositoryError>;

    async fn count_members(&self, room_id: &str) -> Result<usize, RepositoryError>;

    /// Insert a membership if the room exists, the user is not yet in it and
    /// the member count is below the room's `max_members`
    async fn insert_member_with_capacity(
        &self,
        membership: &Membership,
    ) -> Result<JoinOutcome, RepositoryError>;

    /// Remove a membership, handing the host role to the earliest remaining
    /// member or deleting the room when nobody remains
    async fn remove_member(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<LeaveOutcome, RepositoryError>;

    /// Set a member's role. Returns the updated membership, or None if absent.
    async fn update_member_role(
        &self,
        room_id: &str,
        user_id: &str,
        role: RoomRole,
    ) -> Result<Option<Membership>, RepositoryError>;

    // ========== Playlist operations ==========

    /// All items ascending by position
    async fn list_playlist(&self, room_id: &str) -> Result<Vec<PlaylistItem>, RepositoryError>;

    async fn find_playlist_item(&self, id: &str)
        -> Result<Option<PlaylistItem>, RepositoryError>;

    /// Append at max position + 1 (0 when empty)
    async fn append_playlist_item(
        &self,
        item: NewPlaylistItem,
    ) -> Result<PlaylistItem, RepositoryError>;

    /// Delete an item and shift every later item down by one.
    /// Returns the removed item, or None if it was not in this room.
    async fn remove_playlist_item(
        &self,
        room_id: &str,
        item_id: &str,
    ) -> Result<Option<PlaylistItem>, RepositoryError>;

    /// Move an item, shifting the items in between; bounds are checked
    /// against the count read inside the transaction
    async fn move_playlist_item(
        &self,
        room_id: &str,
        item_id: &str,
        new_position: i64,
    ) -> Result<MoveOutcome, RepositoryError>;

    /// Nearest item strictly after / before `position`
    async fn find_adjacent_item(
        &self,
        room_id: &str,
        position: i64,
        direction: PlaylistDirection,
    ) -> Result<Option<PlaylistItem>, RepositoryError>;

    // ========== Playback operations ==========

    async fn get_playback(&self, room_id: &str) -> Result<Option<PlaybackState>, RepositoryError>;

    /// Replace every playback column in one statement
    async fn save_playback(&self, state: &PlaybackState) -> Result<(), RepositoryError>;
}
