//! Per-session turn serialization.
//!
//! Only one turn runs per session at a time. A second message for the same
//! session waits until the first turn has committed or failed; turns for
//! different sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-session turn locks.
///
/// Each session id maps to a `Semaphore(1)`. Holding the permit grants
/// exclusive access to that session's history for one turn.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for the turn lock of a session. The permit releases on drop.
    pub async fn acquire(&self, session_id: &str) -> Result<OwnedSemaphorePermit, LockClosed> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned().await.map_err(|_| LockClosed)
    }

    /// Number of tracked sessions (for monitoring).
    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop lock entries nobody holds or waits on. An entry whose semaphore
    /// is still referenced outside the map is kept, so a waiter never ends
    /// up on a different semaphore than the next caller.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, sem| Arc::strong_count(sem) > 1);
        before - locks.len()
    }
}

/// The semaphore behind a session lock was closed.
#[derive(Debug)]
pub struct LockClosed;

impl std::fmt::Display for LockClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session lock closed")
    }
}

impl std::error::Error for LockClosed {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = SessionLockMap::new();

        let permit1 = map.acquire("s1").await.unwrap();
        drop(permit1);

        let permit2 = map.acquire("s1").await.unwrap();
        drop(permit2);
    }

    #[tokio::test]
    async fn different_sessions_concurrent() {
        let map = Arc::new(SessionLockMap::new());

        let p1 = map.acquire("s1").await.unwrap();
        let p2 = map.acquire("s2").await.unwrap();

        assert_eq!(map.session_count(), 2);

        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_session_waits() {
        let map = Arc::new(SessionLockMap::new());
        let map2 = map.clone();

        let p1 = map.acquire("s1").await.unwrap();

        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("s1").await.unwrap();
            42
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        drop(p1);

        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let map = SessionLockMap::new();
        let held = map.acquire("busy").await.unwrap();
        drop(map.acquire("idle").await.unwrap());

        assert_eq!(map.prune_idle(), 1);
        assert_eq!(map.session_count(), 1);

        drop(held);
        assert_eq!(map.prune_idle(), 1);
        assert_eq!(map.session_count(), 0);
    }
}
