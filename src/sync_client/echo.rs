use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::events::RoomEvent;

/// Pending ids older than this are assumed lost
pub const DEFAULT_ECHO_TTL: Duration = Duration::from_secs(10);

/// Tracks the request ids a client has sent so it can drop the broadcast
/// echo of its own commands instead of reapplying them.
#[derive(Debug)]
pub struct EchoFilter {
    ttl: Duration,
    pending: HashMap<String, Instant>,
}

impl Default for EchoFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ECHO_TTL)
    }
}

impl EchoFilter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: HashMap::new(),
        }
    }

    /// Generate and remember a fresh request id for an outgoing command
    pub fn issue(&mut self, now: Instant) -> String {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.track(request_id.clone(), now);
        request_id
    }

    pub fn track(&mut self, request_id: String, now: Instant) {
        self.prune(now);
        self.pending.insert(request_id, now);
    }

    /// True if `event` answers one of our pending commands. The id is consumed.
    pub fn is_own_echo(&mut self, event: &RoomEvent, now: Instant) -> bool {
        self.prune(now);

        let Some(request_id) = event
            .origin
            .as_ref()
            .and_then(|origin| origin.request_id.as_deref())
        else {
            return false;
        };

        self.pending.remove(request_id).is_some()
    }

    /// Forget ids whose echo never arrived
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.pending
            .retain(|_, issued| now.saturating_duration_since(*issued) <= ttl);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::RoomEventKind;

    fn event_from(request_id: Option<&str>) -> RoomEvent {
        RoomEvent::new(RoomEventKind::VideoStateChanged, "room")
            .with_origin("alice", request_id.map(String::from))
    }

    #[test]
    fn test_own_echo_is_dropped_once() {
        let now = Instant::now();
        let mut filter = EchoFilter::default();
        let id = filter.issue(now);

        let echo = event_from(Some(&id));
        assert!(filter.is_own_echo(&echo, now));
        assert!(!filter.is_own_echo(&echo, now));
        assert_eq!(filter.pending_count(), 0);
    }

    #[test]
    fn test_foreign_and_untagged_events_pass() {
        let now = Instant::now();
        let mut filter = EchoFilter::default();
        filter.issue(now);

        assert!(!filter.is_own_echo(&event_from(Some("someone-else")), now));
        assert!(!filter.is_own_echo(&event_from(None), now));
        assert_eq!(filter.pending_count(), 1);
    }

    #[test]
    fn test_expired_ids_are_forgotten() {
        let start = Instant::now();
        let mut filter = EchoFilter::new(Duration::from_secs(1));
        let id = filter.issue(start);

        let later = start + Duration::from_secs(5);
        assert!(!filter.is_own_echo(&event_from(Some(&id)), later));
        assert_eq!(filter.pending_count(), 0);
    }
}
