//! Session history management for the persona chat gateway.
//!
//! Each session id maps to an ordered, bounded message history owned by a
//! [`HistoryStore`]. The store is an explicit object handed to the turn
//! pipeline; the in-memory implementation lives for the process lifetime
//! unless an idle [`ExpiryPolicy`] is configured.

pub mod lifecycle;
pub mod store;
pub mod window;

pub use lifecycle::ExpiryPolicy;
pub use store::{HistoryStore, InMemoryHistoryStore};
pub use window::{context_window, trim_to_window};
