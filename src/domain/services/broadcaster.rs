use async_broadcast::Receiver;

use crate::domain::events::RoomEvent;

/// Identifies one subscribed client connection
pub type ConnectionId = u64;

/// Per-room fan-out of committed changes.
///
/// Delivery is at-most-once and best-effort: `publish` never waits on a
/// subscriber, and nothing is replayed to late subscribers.
pub trait RoomBroadcaster: Send + Sync {
    /// Attach a connection to the room topic
    fn subscribe(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
        user_id: &str,
    ) -> Receiver<RoomEvent>;

    /// Detach a connection. Does not touch membership.
    fn unsubscribe(&self, room_id: &str, connection_id: ConnectionId);

    /// Deliver an event to every current subscriber of `event.room_id`
    fn publish(&self, event: RoomEvent);

    /// Close the topic; subscribers observe the end of their stream
    fn close_room(&self, room_id: &str);
}
