use serde::Serialize;

/// Kind of event delivered to a room's subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomEventKind {
    MemberJoined,
    MemberLeft,
    RoomUpdated,
    RoomClosed,
    PlaylistItemAdded,
    PlaylistItemRemoved,
    /// Full replacement of the ordered playlist
    PlaylistUpdated,
    VideoStateChanged,
    /// Distinct from a state change so clients can reset their player instance
    VideoChanged,
}

impl RoomEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomEventKind::MemberJoined => "member-joined",
            RoomEventKind::MemberLeft => "member-left",
            RoomEventKind::RoomUpdated => "room-updated",
            RoomEventKind::RoomClosed => "room-closed",
            RoomEventKind::PlaylistItemAdded => "playlist-item-added",
            RoomEventKind::PlaylistItemRemoved => "playlist-item-removed",
            RoomEventKind::PlaylistUpdated => "playlist-updated",
            RoomEventKind::VideoStateChanged => "video-state-changed",
            RoomEventKind::VideoChanged => "video-changed",
        }
    }
}

/// Who issued the command behind an event. Clients match `request_id` against
/// their own pending commands to drop the echo of what they just sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrigin {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Room event for broadcasting
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    pub room_id: String,
    pub kind: RoomEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<EventOrigin>,
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl RoomEvent {
    pub fn new(kind: RoomEventKind, room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            kind,
            action: None,
            origin: None,
            data: serde_json::Value::Object(serde_json::Map::new()),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_origin(mut self, user_id: &str, request_id: Option<String>) -> Self {
        self.origin = Some(EventOrigin {
            user_id: user_id.to_string(),
            request_id,
        });
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
