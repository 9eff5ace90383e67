use serde::{Deserialize, Serialize};

use crate::domain::value_objects::VideoSpec;

/// A queued video. `position` is the zero-based rank inside the room's playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub id: String,
    pub room_id: String,
    pub added_by: String,
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: u32,
    pub position: u32,
    pub added_at: i64,
}

/// Item to append; the store assigns the position inside its transaction
#[derive(Debug, Clone)]
pub struct NewPlaylistItem {
    pub id: String,
    pub room_id: String,
    pub added_by: String,
    pub video: VideoSpec,
    pub added_at: i64,
}

impl NewPlaylistItem {
    pub fn new(id: String, room_id: String, added_by: String, video: VideoSpec) -> Self {
        Self {
            id,
            room_id,
            added_by,
            video,
            added_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn at_position(self, position: u32) -> PlaylistItem {
        PlaylistItem {
            id: self.id,
            room_id: self.room_id,
            added_by: self.added_by,
            video_id: self.video.video_id,
            title: self.video.title,
            thumbnail: self.video.thumbnail,
            duration: self.video.duration,
            position,
            added_at: self.added_at,
        }
    }
}

/// Direction for adjacent-item lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistDirection {
    Next,
    Previous,
}

/// Result of a transactional reorder
#[derive(Debug, Clone)]
pub enum MoveOutcome {
    /// Item moved; holds the item at its new position and the committed order
    Moved {
        item: PlaylistItem,
        playlist: Vec<PlaylistItem>,
    },
    /// Requested position equals the current one, nothing written
    Unchanged(PlaylistItem),
    /// Requested position outside `[0, count - 1]` at transaction time
    OutOfRange { count: u32 },
    /// Item does not exist
    Missing,
    /// Item exists but belongs to another room
    WrongRoom,
}

/// Check the contiguity invariant: positions are exactly `0..n` in order
pub fn positions_are_contiguous(items: &[PlaylistItem]) -> bool {
    let mut positions: Vec<u32> = items.iter().map(|i| i.position).collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, &position)| index as u32 == position)
}
