use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender, TrySendError};

use crate::domain::events::RoomEvent;
use crate::domain::services::{ConnectionId, RoomBroadcaster};

/// A connection attached to a room topic
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub connection_id: ConnectionId,
    pub user_id: String,
    pub connected_at: i64,
}

struct RoomChannel {
    sender: Sender<RoomEvent>,
    /// Holds the channel open while no connection is attached
    _idle: InactiveReceiver<RoomEvent>,
    subscribers: HashMap<ConnectionId, Subscriber>,
}

impl RoomChannel {
    fn open(capacity: usize) -> Self {
        let (mut sender, receiver) = broadcast(capacity.max(1));
        // Lagging subscribers lose their oldest events instead of stalling publishers
        sender.set_overflow(true);
        sender.set_await_active(false);

        Self {
            sender,
            _idle: receiver.deactivate(),
            subscribers: HashMap::new(),
        }
    }
}

/// In-process per-room event hub.
///
/// Each room gets its own bounded broadcast channel, created on first
/// subscribe and closed when the room is closed or the hub shuts down.
pub struct RoomHub {
    capacity: usize,
    rooms: RwLock<HashMap<String, RoomChannel>>,
    next_connection: AtomicU64,
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: RwLock::new(HashMap::new()),
            next_connection: AtomicU64::new(1),
        }
    }

    /// Allocate a process-unique connection id
    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_connection.fetch_add(1, Ordering::Relaxed)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RoomChannel>> {
        self.rooms.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RoomChannel>> {
        self.rooms.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of attached connections for a room
    pub fn subscriber_count(&self, room_id: &str) -> usize {
        self.read()
            .get(room_id)
            .map(|channel| channel.subscribers.len())
            .unwrap_or(0)
    }

    /// Distinct users with at least one open connection, oldest connection first
    pub fn connected_users(&self, room_id: &str) -> Vec<String> {
        let rooms = self.read();
        let Some(channel) = rooms.get(room_id) else {
            return Vec::new();
        };

        let mut subscribers: Vec<&Subscriber> = channel.subscribers.values().collect();
        subscribers.sort_by_key(|s| (s.connected_at, s.connection_id));

        let mut seen = HashSet::new();
        subscribers
            .into_iter()
            .filter(|s| seen.insert(s.user_id.as_str()))
            .map(|s| s.user_id.clone())
            .collect()
    }

    /// Rooms with an open channel
    pub fn room_count(&self) -> usize {
        self.read().len()
    }

    /// Close every room channel. Called once the server stops accepting requests.
    pub fn shutdown(&self) {
        let rooms: Vec<(String, RoomChannel)> = self.write().drain().collect();
        for (room_id, channel) in rooms {
            channel.sender.close();
            tracing::debug!(
                "Closed room channel {} with {} subscribers",
                room_id,
                channel.subscribers.len()
            );
        }
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new(256)
    }
}

impl RoomBroadcaster for RoomHub {
    fn subscribe(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
        user_id: &str,
    ) -> Receiver<RoomEvent> {
        let mut rooms = self.write();
        let channel = rooms
            .entry(room_id.to_string())
            .or_insert_with(|| RoomChannel::open(self.capacity));

        channel.subscribers.insert(
            connection_id,
            Subscriber {
                connection_id,
                user_id: user_id.to_string(),
                connected_at: chrono::Utc::now().timestamp_millis(),
            },
        );

        tracing::debug!(
            "Connection {} (user {}) subscribed to room {}",
            connection_id,
            user_id,
            room_id
        );

        channel.sender.new_receiver()
    }

    fn unsubscribe(&self, room_id: &str, connection_id: ConnectionId) {
        let mut rooms = self.write();
        let Some(channel) = rooms.get_mut(room_id) else {
            return;
        };

        if channel.subscribers.remove(&connection_id).is_some() {
            tracing::debug!(
                "Connection {} unsubscribed from room {}",
                connection_id,
                room_id
            );
        }

        if channel.subscribers.is_empty() {
            rooms.remove(room_id);
        }
    }

    fn publish(&self, event: RoomEvent) {
        let rooms = self.read();
        let Some(channel) = rooms.get(&event.room_id) else {
            tracing::debug!(
                "Event '{}' for room {} has no subscribers",
                event.kind.as_str(),
                event.room_id
            );
            return;
        };

        tracing::debug!(
            "Broadcasting event '{}' to {} receivers in room {}",
            event.kind.as_str(),
            channel.sender.receiver_count(),
            event.room_id
        );

        match channel.sender.try_broadcast(event) {
            Ok(None) => {}
            Ok(Some(dropped)) => {
                tracing::debug!(
                    "Room channel full, dropped oldest event '{}'",
                    dropped.kind.as_str()
                );
            }
            Err(TrySendError::Closed(event)) | Err(TrySendError::Inactive(event)) => {
                tracing::debug!(
                    "Room channel for {} not accepting events, dropped '{}'",
                    event.room_id,
                    event.kind.as_str()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast room event: {:?}", e);
            }
        }
    }

    fn close_room(&self, room_id: &str) {
        if let Some(channel) = self.write().remove(room_id) {
            channel.sender.close();
            tracing::info!(
                "Closed room {} for {} subscribers",
                room_id,
                channel.subscribers.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::RoomEventKind;

    #[tokio::test]
    async fn test_events_reach_only_their_room() {
        let hub = RoomHub::new(16);
        let mut a = hub.subscribe("room-a", hub.next_connection_id(), "alice");
        let mut b = hub.subscribe("room-b", hub.next_connection_id(), "bob");

        hub.publish(RoomEvent::new(RoomEventKind::MemberJoined, "room-a"));

        let event = a.recv().await.unwrap();
        assert_eq!(event.room_id, "room-a");
        assert!(b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lagging_subscriber_does_not_block_publish() {
        let hub = RoomHub::new(2);
        let mut slow = hub.subscribe("room", hub.next_connection_id(), "slow");

        for _ in 0..5 {
            hub.publish(RoomEvent::new(RoomEventKind::VideoStateChanged, "room"));
        }

        // Oldest events were overwritten; the receiver reports the gap then continues
        assert!(matches!(
            slow.recv().await,
            Err(async_broadcast::RecvError::Overflowed(3))
        ));
        assert!(slow.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_close_room_ends_streams() {
        let hub = RoomHub::new(8);
        let mut rx = hub.subscribe("room", hub.next_connection_id(), "alice");

        hub.close_room("room");

        assert!(matches!(
            rx.recv().await,
            Err(async_broadcast::RecvError::Closed)
        ));
        assert_eq!(hub.room_count(), 0);
    }

    #[test]
    fn test_subscriber_tracking() {
        let hub = RoomHub::new(8);
        let first = hub.next_connection_id();
        let second = hub.next_connection_id();
        let third = hub.next_connection_id();

        let _r1 = hub.subscribe("room", first, "alice");
        let _r2 = hub.subscribe("room", second, "alice");
        let _r3 = hub.subscribe("room", third, "bob");

        assert_eq!(hub.subscriber_count("room"), 3);
        let users = hub.connected_users("room");
        assert_eq!(users.len(), 2);
        assert!(users.contains(&"alice".to_string()));

        hub.unsubscribe("room", first);
        hub.unsubscribe("room", second);
        assert_eq!(hub.connected_users("room"), vec!["bob".to_string()]);

        hub.unsubscribe("room", third);
        assert_eq!(hub.room_count(), 0);
    }

    #[test]
    fn test_shutdown_closes_all_rooms() {
        let hub = RoomHub::default();
        let _a = hub.subscribe("a", hub.next_connection_id(), "u1");
        let _b = hub.subscribe("b", hub.next_connection_id(), "u2");

        hub.shutdown();
        assert_eq!(hub.room_count(), 0);
    }
}
