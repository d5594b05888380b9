//! Idle expiry for session histories.
//!
//! Expiry is evaluated lazily when a session is read and, optionally, by a
//! periodic sweep. With no idle limit configured, sessions live for the
//! lifetime of the process.

use chrono::{DateTime, Duration, Utc};

use pc_domain::config::SessionsConfig;
use pc_domain::trace::TraceEvent;

use crate::store::HistoryStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryPolicy {
    idle: Option<Duration>,
}

impl ExpiryPolicy {
    pub fn new(idle_minutes: Option<u32>) -> Self {
        Self {
            idle: idle_minutes.map(|m| Duration::minutes(m as i64)),
        }
    }

    pub fn from_config(cfg: &SessionsConfig) -> Self {
        Self::new(cfg.idle_minutes)
    }

    /// Never expires.
    pub fn disabled() -> Self {
        Self { idle: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.idle.is_some()
    }

    /// Whether a session last written at `last_active` is stale at `now`.
    pub fn is_expired(&self, last_active: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.idle {
            Some(idle) => now.signed_duration_since(last_active) >= idle,
            None => false,
        }
    }

    /// Clear the session if it has gone stale. Returns `true` when it was
    /// dropped.
    pub fn expire_if_stale(
        &self,
        store: &dyn HistoryStore,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let stale = store
            .last_active(session_id)
            .is_some_and(|last| self.is_expired(last, now));
        if stale {
            store.clear(session_id);
            tracing::debug!(session_id, "session expired after idle timeout");
        }
        stale
    }

    /// Remove every stale session from the store.
    pub fn sweep(&self, store: &dyn HistoryStore, now: DateTime<Utc>) -> usize {
        let Some(idle) = self.idle else {
            return 0;
        };
        let removed = store.prune_idle(now - idle);
        if removed > 0 {
            TraceEvent::SessionsPruned {
                removed,
                remaining: store.session_count(),
            }
            .emit();
        }
        removed
    }
}
