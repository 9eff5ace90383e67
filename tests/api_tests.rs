//! API Integration Tests for the SyncRoom backend
//!
//! Drives the HTTP surface end to end against an in-memory database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::{Service, ServiceExt};

use syncroom_backend::api;
use syncroom_backend::domain::events::RoomEventKind;
use syncroom_backend::domain::services::RoomBroadcaster;
use syncroom_backend::infrastructure::app_state::AppState;
use syncroom_backend::infrastructure::config::AppConfig;

/// Helper to create a test application
async fn create_test_app() -> (Router, Arc<AppState>) {
    let state = AppState::from_config(AppConfig::in_memory("test-secret-key"))
        .await
        .expect("Failed to create app state");
    let state = Arc::new(state);

    (api::create_app(state.clone()), state)
}

fn token_for(state: &AppState, user_id: &str) -> String {
    state.jwt_service.sign(user_id, user_id).unwrap()
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = ServiceExt::<Request<Body>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a request with JSON body and auth header
async fn json_auth(
    app: &mut Router,
    method: &str,
    path: &str,
    body: Value,
    token: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    send(app, request).await
}

async fn post_json_auth(
    app: &mut Router,
    path: &str,
    body: Value,
    token: &str,
) -> (StatusCode, Value) {
    json_auth(app, "POST", path, body, token).await
}

async fn patch_json_auth(
    app: &mut Router,
    path: &str,
    body: Value,
    token: &str,
) -> (StatusCode, Value) {
    json_auth(app, "PATCH", path, body, token).await
}

/// Helper to make a bodyless request with auth header
async fn empty_auth(app: &mut Router, method: &str, path: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn get_auth(app: &mut Router, path: &str, token: &str) -> (StatusCode, Value) {
    empty_auth(app, "GET", path, token).await
}

async fn get(app: &mut Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Create a public room hosted by `token`'s user, returning its id
async fn create_room(app: &mut Router, token: &str, body: Value) -> String {
    let (status, body) = post_json_auth(app, "/api/rooms", body, token).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["room"]["id"].as_str().unwrap().to_string()
}

async fn add_video(app: &mut Router, room_id: &str, token: &str, video_id: &str) -> Value {
    let (status, body) = post_json_auth(
        app,
        &format!("/api/rooms/{}/playlist", room_id),
        json!({"videoId": video_id, "title": format!("Video {}", video_id), "duration": 120}),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add failed: {}", body);
    body["item"].clone()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let (mut app, _state) = create_test_app().await;

    let (status, body) = get(&mut app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["activeRooms"], 0);
}

// ============================================================================
// Room Tests
// ============================================================================

#[tokio::test]
async fn test_create_room_requires_auth() {
    let (mut app, _state) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/rooms")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({"name": "Movie night"}).to_string()))
        .unwrap();

    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_missing_name() {
    let (mut app, state) = create_test_app().await;
    let token = token_for(&state, "alice");

    let (status, body) = post_json_auth(&mut app, "/api/rooms", json!({"name": "  "}), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_ROOM_NAME");
}

#[tokio::test]
async fn test_create_private_room_without_password() {
    let (mut app, state) = create_test_app().await;
    let token = token_for(&state, "alice");

    let (status, body) = post_json_auth(
        &mut app,
        "/api/rooms",
        json!({"name": "Secret", "isPublic": false}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CONFIG");
}

#[tokio::test]
async fn test_create_room_success() {
    let (mut app, state) = create_test_app().await;
    let token = token_for(&state, "alice");

    let (status, body) = post_json_auth(
        &mut app,
        "/api/rooms",
        json!({"name": "Movie night", "description": "Friday films", "maxMembers": 10}),
        &token,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["room"]["name"], "Movie night");
    assert_eq!(body["room"]["visibility"], "public");
    assert_eq!(body["room"]["hasPassword"], false);
    assert_eq!(body["room"]["hostId"], "alice");
    assert_eq!(body["room"]["memberCount"], 1);
    assert_eq!(body["membership"]["role"], "host");
    assert!(body["room"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_list_rooms_hides_private_rooms() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");

    create_room(&mut app, &alice, json!({"name": "Open"})).await;
    create_room(
        &mut app,
        &alice,
        json!({"name": "Closed", "isPublic": false, "password": "hunter2"}),
    )
    .await;

    let (status, body) = get(&mut app, "/api/rooms").await;
    assert_eq!(status, StatusCode::OK);
    let rooms = body["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["name"], "Open");
    assert_eq!(rooms[0]["isMember"], false);
    assert_eq!(body["limit"], 20);

    let (_, body) = get_auth(&mut app, "/api/rooms", &alice).await;
    assert_eq!(body["rooms"][0]["isMember"], true);
}

#[tokio::test]
async fn test_get_room_hides_members_from_outsiders() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (status, body) = get(&mut app, &format!("/api/rooms/{}", room_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isMember"], false);
    assert!(body.get("members").is_none());
    assert_eq!(body["room"]["memberCount"], 1);

    let (_, body) = get_auth(&mut app, &format!("/api/rooms/{}", room_id), &alice).await;
    assert_eq!(body["isMember"], true);
    assert_eq!(body["role"], "host");
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_missing_room() {
    let (mut app, _state) = create_test_app().await;

    let (status, body) = get(&mut app, "/api/rooms/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// ============================================================================
// Membership Tests
// ============================================================================

#[tokio::test]
async fn test_join_room_flow() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let bob = token_for(&state, "bob");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["membership"]["role"], "member");
    assert_eq!(body["snapshot"]["members"].as_array().unwrap().len(), 2);
    assert_eq!(body["room"]["memberCount"], 2);

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &bob).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_MEMBER");
}

#[tokio::test]
async fn test_join_full_room() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Pair", "maxMembers": 2})).await;

    let path = format!("/api/rooms/{}/join", room_id);
    let (status, _) = post_json_auth(&mut app, &path, json!({}), &token_for(&state, "bob")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        post_json_auth(&mut app, &path, json!({}), &token_for(&state, "carol")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ROOM_FULL");
}

#[tokio::test]
async fn test_join_private_room_password_checks() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let bob = token_for(&state, "bob");
    let room_id = create_room(
        &mut app,
        &alice,
        json!({"name": "Secret", "isPublic": false, "password": "hunter2"}),
    )
    .await;
    let path = format!("/api/rooms/{}/join", room_id);

    let (status, body) = post_json_auth(&mut app, &path, json!({}), &bob).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PASSWORD_REQUIRED");

    let (status, body) = post_json_auth(&mut app, &path, json!({"password": "wrong"}), &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INVALID_PASSWORD");

    let (status, _) = post_json_auth(&mut app, &path, json!({"password": "hunter2"}), &bob).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_host_leave_transfers_host() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let bob = token_for(&state, "bob");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;
    post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &bob).await;

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/rooms/{}/leave", room_id), json!({}), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newHostId"], "bob");
    assert_eq!(body["roomDeleted"], false);

    let (_, body) = get_auth(&mut app, &format!("/api/rooms/{}", room_id), &bob).await;
    assert_eq!(body["room"]["hostId"], "bob");
    assert_eq!(body["role"], "host");
}

#[tokio::test]
async fn test_last_member_leave_deletes_room() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Solo"})).await;

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/rooms/{}/leave", room_id), json!({}), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomDeleted"], true);

    let (status, _) = get(&mut app, &format!("/api/rooms/{}", room_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_member_role_host_only() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let bob = token_for(&state, "bob");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;
    post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &bob).await;

    let path = format!("/api/rooms/{}/members/bob/role", room_id);
    let (status, _) = patch_json_auth(&mut app, &path, json!({"role": "moderator"}), &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = patch_json_auth(&mut app, &path, json!({"role": "wizard"}), &alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ROLE");

    let (status, body) =
        patch_json_auth(&mut app, &path, json!({"role": "moderator"}), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["membership"]["role"], "moderator");
}

#[tokio::test]
async fn test_moderator_can_update_settings() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let bob = token_for(&state, "bob");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;
    post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &bob).await;

    let room_path = format!("/api/rooms/{}", room_id);
    let (status, _) = patch_json_auth(&mut app, &room_path, json!({"name": "Renamed"}), &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    patch_json_auth(
        &mut app,
        &format!("/api/rooms/{}/members/bob/role", room_id),
        json!({"role": "moderator"}),
        &alice,
    )
    .await;

    let (status, body) =
        patch_json_auth(&mut app, &room_path, json!({"name": "Renamed"}), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["name"], "Renamed");
    assert_eq!(body["changed"], true);

    // Cannot shrink below current occupancy
    let (status, _) = patch_json_auth(&mut app, &room_path, json!({"maxMembers": 2}), &alice).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) =
        post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &token_for(&state, "carol")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ROOM_FULL");
}

#[tokio::test]
async fn test_delete_room_host_only() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let bob = token_for(&state, "bob");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;
    post_json_auth(&mut app, &format!("/api/rooms/{}/join", room_id), json!({}), &bob).await;

    let path = format!("/api/rooms/{}", room_id);
    let (status, _) = empty_auth(&mut app, "DELETE", &path, &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = empty_auth(&mut app, "DELETE", &path, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedRoomId"], room_id.as_str());

    let (status, _) = get(&mut app, &path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Playlist Tests
// ============================================================================

#[tokio::test]
async fn test_playlist_requires_membership() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (status, body) = get_auth(
        &mut app,
        &format!("/api/rooms/{}/playlist", room_id),
        &token_for(&state, "mallory"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_playlist_add_reorder_remove() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let a = add_video(&mut app, &room_id, &alice, "a").await;
    let b = add_video(&mut app, &room_id, &alice, "b").await;
    let c = add_video(&mut app, &room_id, &alice, "c").await;
    assert_eq!(a["position"], 0);
    assert_eq!(c["position"], 2);

    // Move c to the front: c, a, b
    let (status, body) = patch_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playlist/items/{}/position", room_id, c["id"].as_str().unwrap()),
        json!({"newPosition": 0}),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved"], true);
    let order: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["videoId"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["c", "a", "b"]);

    // Remove a: c, b with contiguous positions
    let (status, _) = empty_auth(
        &mut app,
        "DELETE",
        &format!("/api/rooms/{}/playlist/items/{}", room_id, a["id"].as_str().unwrap()),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_auth(&mut app, &format!("/api/rooms/{}/playlist", room_id), &alice).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["videoId"], "c");
    assert_eq!(items[0]["position"], 0);
    assert_eq!(items[1]["id"], b["id"]);
    assert_eq!(items[1]["position"], 1);
}

#[tokio::test]
async fn test_reorder_out_of_range() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;
    let a = add_video(&mut app, &room_id, &alice, "a").await;

    let (status, body) = patch_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playlist/items/{}/position", room_id, a["id"].as_str().unwrap()),
        json!({"newPosition": 5}),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_playlist_navigation() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (_, body) = get_auth(&mut app, &format!("/api/rooms/{}/playlist/current", room_id), &alice).await;
    assert!(body["item"].is_null());

    add_video(&mut app, &room_id, &alice, "a").await;
    add_video(&mut app, &room_id, &alice, "b").await;

    let (_, body) = get_auth(&mut app, &format!("/api/rooms/{}/playlist/current", room_id), &alice).await;
    assert_eq!(body["item"]["videoId"], "a");

    let (_, body) =
        get_auth(&mut app, &format!("/api/rooms/{}/playlist/next?position=0", room_id), &alice).await;
    assert_eq!(body["item"]["videoId"], "b");

    // No wraparound past the last item
    let (_, body) =
        get_auth(&mut app, &format!("/api/rooms/{}/playlist/next?position=1", room_id), &alice).await;
    assert!(body["item"].is_null());

    let (_, body) = get_auth(
        &mut app,
        &format!("/api/rooms/{}/playlist/previous?position=1", room_id),
        &alice,
    )
    .await;
    assert_eq!(body["item"]["videoId"], "a");
}

#[tokio::test]
async fn test_play_next_switches_video() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;
    add_video(&mut app, &room_id, &alice, "a").await;
    add_video(&mut app, &room_id, &alice, "b").await;

    let path = format!("/api/rooms/{}/playlist/play-next", room_id);
    let (status, body) = post_json_auth(&mut app, &path, json!({"currentPosition": 0}), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["playback"]["videoId"], "b");
    assert_eq!(body["playback"]["elapsedSeconds"], 0.0);

    let (_, body) = post_json_auth(&mut app, &path, json!({"currentPosition": 1}), &alice).await;
    assert_eq!(body["changed"], false);

    let (_, body) = get_auth(&mut app, &format!("/api/rooms/{}/playback", room_id), &alice).await;
    assert_eq!(body["playback"]["videoId"], "b");
}

// ============================================================================
// Playback Tests
// ============================================================================

#[tokio::test]
async fn test_playback_controls() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (status, body) = get_auth(&mut app, &format!("/api/rooms/{}/playback", room_id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playback"]["isPlaying"], false);
    assert_eq!(body["playback"]["playbackRate"], 1.0);

    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playback/play", room_id),
        json!({"time": 12.5}),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playback"]["isPlaying"], true);
    assert_eq!(body["playback"]["elapsedSeconds"], 12.5);

    let (_, body) = post_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playback/pause", room_id),
        json!({"time": 20.0}),
        &alice,
    )
    .await;
    assert_eq!(body["playback"]["isPlaying"], false);
    assert_eq!(body["playback"]["position"], 20.0);

    let (_, body) = post_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playback/rate", room_id),
        json!({"rate": 1.5}),
        &alice,
    )
    .await;
    assert_eq!(body["playback"]["playbackRate"], 1.5);
}

#[tokio::test]
async fn test_playback_rejects_invalid_values() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playback/seek", room_id),
        json!({"time": -3.0}),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (status, _) = post_json_auth(
        &mut app,
        &format!("/api/rooms/{}/playback/rate", room_id),
        json!({"rate": 4.0}),
        &alice,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_playback_command_broadcasts_with_request_id() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let mut receiver = state
        .room_hub
        .subscribe(&room_id, state.room_hub.next_connection_id(), "bob");

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/rooms/{}/playback/seek", room_id))
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", alice))
        .header("x-request-id", "req-42")
        .body(Body::from(json!({"time": 30.0}).to_string()))
        .unwrap();
    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestId"], "req-42");

    let event = receiver.recv().await.unwrap();
    assert_eq!(event.kind, RoomEventKind::VideoStateChanged);
    assert_eq!(event.action.as_deref(), Some("seek"));
    let origin = event.origin.unwrap();
    assert_eq!(origin.user_id, "alice");
    assert_eq!(origin.request_id.as_deref(), Some("req-42"));
}

// ============================================================================
// Event Stream Tests
// ============================================================================

#[tokio::test]
async fn test_event_stream_auth() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let (status, _) = get(&mut app, &format!("/api/rooms/{}/events", room_id)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(
        &mut app,
        &format!("/api/rooms/{}/events?token={}", room_id, token_for(&state, "mallory")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&mut app, &format!("/api/rooms/missing/events?token={}", alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_stream_sends_connected_snapshot() {
    let (mut app, state) = create_test_app().await;
    let alice = token_for(&state, "alice");
    let room_id = create_room(&mut app, &alice, json!({"name": "Movie night"})).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/rooms/{}/events?token={}", room_id, alice))
        .body(Body::empty())
        .unwrap();
    let response = ServiceExt::<Request<Body>>::ready(&mut app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.room_hub.subscriber_count(&room_id), 1);

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: connected"));
    assert!(text.contains("\"playback\""));

    // Dropping the stream detaches the subscriber
    drop(body);
    assert_eq!(state.room_hub.subscriber_count(&room_id), 0);
}
