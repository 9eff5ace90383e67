use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<Mutex<()>>>;

/// Per-room command serialization.
///
/// A mutating command holds its room's guard from validation through commit
/// and broadcast, so the next command on that room sees committed state and
/// events leave in commit order. Rooms never share a lock.
///
/// Entries only live while a command holds or waits for them, so ids of
/// missing or deleted rooms leave nothing behind.
#[derive(Default)]
pub struct RoomCommandLocks {
    locks: Arc<StdMutex<LockMap>>,
}

/// Exclusive command access to one room; released on drop
pub struct RoomCommandGuard {
    room_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
}

fn lock_map(locks: &StdMutex<LockMap>) -> StdMutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|e| e.into_inner())
}

impl RoomCommandLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive command access to a room
    pub async fn acquire(&self, room_id: &str) -> RoomCommandGuard {
        let lock = lock_map(&self.locks)
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        RoomCommandGuard {
            room_id: room_id.to_string(),
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
        }
    }

    /// Rooms with a command running or queued
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for RoomCommandGuard {
    fn drop(&mut self) {
        self.guard.take();

        // Waiters clone the entry under the map lock, so a count of one means
        // the map holds the last reference
        let mut locks = lock_map(&self.locks);
        if locks
            .get(&self.room_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.room_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_room_is_serialized() {
        let locks = Arc::new(RoomCommandLocks::new());
        let guard = locks.acquire("room-a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("room-a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender acquires after release")
            .unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_rooms_do_not_block() {
        let locks = RoomCommandLocks::new();
        let a = locks.acquire("room-a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("room-b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);

        drop(a);
        assert_eq!(locks.len(), 1);
        drop(b);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_survives_while_a_waiter_is_queued() {
        let locks = Arc::new(RoomCommandLocks::new());
        let first = locks.acquire("room").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("room").await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
