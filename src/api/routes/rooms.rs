use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::dto::{api_error, error_response, request_id, ApiError, RoomResponse};
use crate::api::middleware::Claims;
use crate::api::AppState;
use crate::application::rooms::{
    CreateRoom, CreateRoomInput, DeleteRoom, DeleteRoomInput, GetRoom, GetRoomInput, JoinRoom,
    JoinRoomInput, LeaveRoom, LeaveRoomInput, ListMembers, ListPublicRooms, ListRoomsInput,
    UpdateMemberRole, UpdateMemberRoleInput, UpdateRoom, UpdateRoomInput,
};
use crate::application::{is_member, RoomSnapshot};
use crate::domain::entities::{Membership, RoomRole};
use crate::domain::value_objects::{RoomPatch, RoomSettings, DEFAULT_MAX_MEMBERS};

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub password: Option<String>,
    pub max_members: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListRoomsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub success: bool,
    pub room: RoomResponse,
    pub membership: Membership,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListItem {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub is_member: bool,
}

#[derive(Debug, Serialize)]
pub struct ListRoomsResponse {
    pub success: bool,
    pub rooms: Vec<RoomListItem>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailsResponse {
    pub success: bool,
    pub room: RoomResponse,
    pub is_member: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoomRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Membership>>,
    /// Users with an open event stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_user_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub success: bool,
    pub membership: Membership,
    pub room: RoomResponse,
    pub snapshot: RoomSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomResponse {
    pub success: bool,
    pub message: String,
    pub new_host_id: Option<String>,
    pub room_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomResponse {
    pub success: bool,
    pub room: RoomResponse,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoomResponse {
    pub success: bool,
    pub message: String,
    pub deleted_room_id: String,
    pub deleted_room_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub success: bool,
    pub members: Vec<Membership>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub success: bool,
    pub membership: Membership,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/rooms - List public rooms
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    claims: Option<Extension<Claims>>,
    Query(query): Query<ListRoomsQuery>,
) -> Result<Json<ListRoomsResponse>, ApiError> {
    let use_case = ListPublicRooms::new(state.room_repo.clone());
    let result = use_case
        .execute(ListRoomsInput {
            limit: query.limit,
            offset: query.offset,
        })
        .await
        .map_err(api_error)?;

    let mut rooms = Vec::with_capacity(result.rooms.len());
    for entry in result.rooms {
        let member = match &claims {
            Some(Extension(claims)) => {
                is_member(state.room_repo.as_ref(), &entry.room.id, &claims.user_id)
                    .await
                    .map_err(api_error)?
            }
            None => false,
        };
        rooms.push(RoomListItem {
            room: RoomResponse::from_room(&entry.room, Some(entry.member_count)),
            is_member: member,
        });
    }

    Ok(Json(ListRoomsResponse {
        success: true,
        rooms,
        limit: result.limit,
        offset: result.offset,
    }))
}

/// POST /api/rooms - Create a room hosted by the caller
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "MISSING_ROOM_NAME",
            "Room name is required",
        ));
    }

    let settings = RoomSettings {
        name: body.name,
        description: body.description,
        is_public: body.is_public.unwrap_or(true),
        password: body.password.filter(|p| !p.is_empty()),
        max_members: body.max_members.unwrap_or(DEFAULT_MAX_MEMBERS),
    };

    let use_case = CreateRoom::new(state.room_repo.clone());
    let result = use_case
        .execute(CreateRoomInput {
            owner_id: claims.user_id.clone(),
            settings,
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            success: true,
            room: RoomResponse::from_room(&result.room, Some(1)),
            membership: result.membership,
        }),
    ))
}

/// GET /api/rooms/:roomId - Room details; members only visible to members
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    claims: Option<Extension<Claims>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailsResponse>, ApiError> {
    let use_case = GetRoom::new(state.room_repo.clone());
    let result = use_case
        .execute(GetRoomInput {
            room_id,
            user_id: claims.map(|Extension(c)| c.user_id),
        })
        .await
        .map_err(api_error)?;

    let online_user_ids = result
        .membership
        .as_ref()
        .map(|_| state.room_hub.connected_users(&result.room.id));

    Ok(Json(RoomDetailsResponse {
        success: true,
        room: RoomResponse::from_room(&result.room, Some(result.member_count)),
        is_member: result.membership.is_some(),
        role: result.membership.as_ref().map(|m| m.role),
        members: result.members,
        online_user_ids,
    }))
}

/// PATCH /api/rooms/:roomId - Update room settings
pub async fn update_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<RoomPatch>,
) -> Result<Json<UpdateRoomResponse>, ApiError> {
    let request_id = request_id(&headers);

    let use_case = UpdateRoom::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let result = use_case
        .execute(UpdateRoomInput {
            room_id,
            user_id: claims.user_id.clone(),
            patch,
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(UpdateRoomResponse {
        success: true,
        room: RoomResponse::from_room(&result.room, None),
        changed: result.changed,
        request_id,
    }))
}

/// DELETE /api/rooms/:roomId - Delete a room (host only)
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteRoomResponse>, ApiError> {
    let request_id = request_id(&headers);

    let use_case = DeleteRoom::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let result = use_case
        .execute(DeleteRoomInput {
            room_id,
            user_id: claims.user_id.clone(),
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(DeleteRoomResponse {
        success: true,
        message: format!("Room \"{}\" has been deleted", result.room_name),
        deleted_room_id: result.room_id,
        deleted_room_name: result.room_name,
        request_id,
    }))
}

/// POST /api/rooms/:roomId/join - Join a room
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<JoinRoomRequest>>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let request_id = request_id(&headers);
    let password = body.and_then(|Json(b)| b.password);

    let use_case = JoinRoom::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let result = use_case
        .execute(JoinRoomInput {
            room_id,
            user_id: claims.user_id.clone(),
            password,
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(JoinRoomResponse {
        success: true,
        membership: result.membership,
        room: RoomResponse::from_room(&result.snapshot.room, Some(result.snapshot.members.len())),
        snapshot: result.snapshot,
        request_id,
    }))
}

/// POST /api/rooms/:roomId/leave - Leave a room
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LeaveRoomResponse>, ApiError> {
    let request_id = request_id(&headers);

    let use_case = LeaveRoom::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let result = use_case
        .execute(LeaveRoomInput {
            room_id,
            user_id: claims.user_id.clone(),
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    let message = if result.room_deleted {
        "Left room, room was deleted".to_string()
    } else if result.new_host_id.is_some() {
        "Left room, host role transferred".to_string()
    } else {
        "Left room".to_string()
    };

    Ok(Json(LeaveRoomResponse {
        success: true,
        message,
        new_host_id: result.new_host_id,
        room_deleted: result.room_deleted,
        request_id,
    }))
}

/// GET /api/rooms/:roomId/members - Members by role then join order
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<MembersResponse>, ApiError> {
    let use_case = ListMembers::new(state.room_repo.clone());
    let members = use_case.execute(&room_id).await.map_err(api_error)?;

    Ok(Json(MembersResponse {
        success: true,
        members,
    }))
}

/// PATCH /api/rooms/:roomId/members/:userId/role - Change a member's role (host only)
pub async fn update_member_role(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path((room_id, target_user_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let request_id = request_id(&headers);

    let role = RoomRole::from_str(&body.role).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_ROLE",
            format!("Unknown role: {}", body.role),
        )
    })?;

    let use_case = UpdateMemberRole::new(
        state.room_repo.clone(),
        state.room_hub.clone(),
        state.room_locks.clone(),
    );
    let membership = use_case
        .execute(UpdateMemberRoleInput {
            room_id,
            requester_id: claims.user_id.clone(),
            target_user_id,
            role,
            request_id: request_id.clone(),
        })
        .await
        .map_err(api_error)?;

    Ok(Json(MembershipResponse {
        success: true,
        membership,
        request_id,
    }))
}
