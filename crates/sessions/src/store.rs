//! Session history store.
//!
//! [`HistoryStore`] is the contract the turn pipeline writes through; the
//! in-memory implementation keeps everything in a process-local map. Every
//! operation on a single key is atomic with respect to other operations on
//! that key. Serializing whole turns (read → model call → commit) is the
//! caller's job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use pc_domain::message::ChatMessage;

use crate::window::trim_to_window;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub trait HistoryStore: Send + Sync {
    /// Ordered history for a session; empty when the session is unknown.
    fn get(&self, session_id: &str) -> Vec<ChatMessage>;

    /// Append `messages` in order, then trim the oldest entries down to
    /// `retention`. Creates the session if needed. Returns the new length.
    fn append(&self, session_id: &str, messages: Vec<ChatMessage>, retention: usize) -> usize;

    /// Remove a session. Returns whether it existed; clearing an unknown
    /// session is not an error.
    fn clear(&self, session_id: &str) -> bool;

    /// When the session was last written, if it exists.
    fn last_active(&self, session_id: &str) -> Option<DateTime<Utc>>;

    /// Number of tracked sessions.
    fn session_count(&self) -> usize;

    /// Drop every session last written before `cutoff`. Returns how many
    /// were removed.
    fn prune_idle(&self, cutoff: DateTime<Utc>) -> usize;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
struct SessionHistory {
    messages: Vec<ChatMessage>,
    last_active: DateTime<Utc>,
}

/// Process-lifetime store backed by a `HashMap` behind a read-write lock.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<String, SessionHistory>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn get(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .get(session_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    fn append(&self, session_id: &str, messages: Vec<ChatMessage>, retention: usize) -> usize {
        let mut sessions = self.sessions.write();
        let entry = sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| SessionHistory {
                messages: Vec::new(),
                last_active: Utc::now(),
            });
        entry.messages.extend(messages);
        let trimmed = trim_to_window(&mut entry.messages, retention);
        entry.last_active = Utc::now();

        if trimmed > 0 {
            tracing::debug!(session_id, trimmed, "history trimmed to retention window");
        }
        entry.messages.len()
    }

    fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    fn last_active(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.sessions.read().get(session_id).map(|s| s.last_active)
    }

    fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    fn prune_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active >= cutoff);
        before - sessions.len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
