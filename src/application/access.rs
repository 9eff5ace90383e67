use serde::Serialize;

use crate::application::SyncError;
use crate::domain::entities::{Membership, PlaybackState, PlaylistItem, Room};
use crate::domain::repositories::RoomRepository;

/// Full view of a room handed to a member on join
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room: Room,
    pub members: Vec<Membership>,
    pub playlist: Vec<PlaylistItem>,
    pub playback: Option<PlaybackState>,
}

pub(crate) async fn require_room<R: RoomRepository + ?Sized>(
    repo: &R,
    room_id: &str,
) -> Result<Room, SyncError> {
    repo.find_room(room_id)
        .await?
        .ok_or_else(SyncError::room_not_found)
}

/// Room must exist (`NotFound`) and the user must hold a seat in it (`Forbidden`)
pub(crate) async fn require_member<R: RoomRepository + ?Sized>(
    repo: &R,
    room_id: &str,
    user_id: &str,
) -> Result<(Room, Membership), SyncError> {
    let room = require_room(repo, room_id).await?;
    let membership = repo
        .find_membership(room_id, user_id)
        .await?
        .ok_or_else(|| SyncError::Forbidden("You are not a member of this room".to_string()))?;
    Ok((room, membership))
}

/// Authorization predicate: does `user_id` hold a seat in `room_id`
pub async fn is_member<R: RoomRepository + ?Sized>(
    repo: &R,
    room_id: &str,
    user_id: &str,
) -> Result<bool, SyncError> {
    Ok(repo.find_membership(room_id, user_id).await?.is_some())
}

pub(crate) async fn load_snapshot<R: RoomRepository + ?Sized>(
    repo: &R,
    room_id: &str,
) -> Result<RoomSnapshot, SyncError> {
    let room = require_room(repo, room_id).await?;
    let members = repo.list_members(room_id).await?;
    let playlist = repo.list_playlist(room_id).await?;
    let playback = repo.get_playback(room_id).await?;

    Ok(RoomSnapshot {
        room,
        members,
        playlist,
        playback,
    })
}
