use serde::{Deserialize, Serialize};

use crate::domain::value_objects::RoomSettings;

/// Room visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomVisibility {
    Public,
    Private,
}

impl RoomVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomVisibility::Public => "public",
            RoomVisibility::Private => "private",
        }
    }

    pub fn from_is_public(is_public: bool) -> Self {
        if is_public {
            RoomVisibility::Public
        } else {
            RoomVisibility::Private
        }
    }
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub max_members: u32,
    pub host_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Room {
    /// Create a new room hosted by `host_id`
    pub fn new(
        id: String,
        host_id: String,
        settings: &RoomSettings,
        password_hash: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            name: settings.name.trim().to_string(),
            description: settings.description.clone(),
            is_public: settings.is_public,
            password_hash,
            max_members: settings.max_members,
            host_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn visibility(&self) -> RoomVisibility {
        RoomVisibility::from_is_public(self.is_public)
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Check if room is full
    pub fn is_full(&self, current_member_count: usize) -> bool {
        current_member_count >= self.max_members as usize
    }

    /// A private room must always carry a password hash
    pub fn is_consistent(&self) -> bool {
        self.is_public || self.has_password()
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Room with its member count (listing)
#[derive(Debug, Clone)]
pub struct RoomWithMemberCount {
    pub room: Room,
    pub member_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(is_public: bool, max_members: u32) -> RoomSettings {
        RoomSettings {
            name: "  Movie night ".to_string(),
            description: None,
            is_public,
            password: None,
            max_members,
        }
    }

    #[test]
    fn test_new_room_trims_name() {
        let room = Room::new("r1".into(), "u1".into(), &settings(true, 10), None);
        assert_eq!(room.name, "Movie night");
        assert_eq!(room.host_id, "u1");
        assert_eq!(room.created_at, room.updated_at);
    }

    #[test]
    fn test_is_full() {
        let room = Room::new("r1".into(), "u1".into(), &settings(true, 2), None);
        assert!(!room.is_full(1));
        assert!(room.is_full(2));
        assert!(room.is_full(3));
    }

    #[test]
    fn test_private_room_consistency() {
        let room = Room::new("r1".into(), "u1".into(), &settings(false, 5), None);
        assert!(!room.is_consistent());

        let room = Room::new(
            "r1".into(),
            "u1".into(),
            &settings(false, 5),
            Some("$argon2id$hash".into()),
        );
        assert!(room.is_consistent());
        assert_eq!(room.visibility(), RoomVisibility::Private);
    }
}
