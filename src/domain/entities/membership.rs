use serde::{Deserialize, Serialize};

/// Role of a member inside a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    Host,
    Moderator,
    Member,
}

impl RoomRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomRole::Host => "host",
            RoomRole::Moderator => "moderator",
            RoomRole::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "host" => Some(RoomRole::Host),
            "moderator" => Some(RoomRole::Moderator),
            "member" => Some(RoomRole::Member),
            _ => None,
        }
    }

    /// Host and moderators may edit room settings
    pub fn can_update_room(&self) -> bool {
        matches!(self, RoomRole::Host | RoomRole::Moderator)
    }
}

/// Membership entity - a user's seat in a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: i64,
    pub room_id: String,
    pub user_id: String,
    pub role: RoomRole,
    pub joined_at: i64,
}

impl Membership {
    pub fn new(room_id: String, user_id: String, role: RoomRole) -> Self {
        Self {
            id: 0, // Set by database
            room_id,
            user_id,
            role,
            joined_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == RoomRole::Host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_is_case_insensitive() {
        assert_eq!(RoomRole::from_str("HOST"), Some(RoomRole::Host));
        assert_eq!(RoomRole::from_str("Moderator"), Some(RoomRole::Moderator));
        assert_eq!(RoomRole::from_str("member"), Some(RoomRole::Member));
        assert_eq!(RoomRole::from_str("owner"), None);
    }

    #[test]
    fn test_update_rights() {
        assert!(RoomRole::Host.can_update_room());
        assert!(RoomRole::Moderator.can_update_room());
        assert!(!RoomRole::Member.can_update_room());
    }
}
