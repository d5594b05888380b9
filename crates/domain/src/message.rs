use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

/// Who authored a message in a session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single committed message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Serialized as epoch milliseconds for the UI.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp,
        }
    }

    /// Strip the timestamp for use as model context.
    pub fn to_context(&self) -> ContextEntry {
        ContextEntry {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A `{role, content}` pair sent to the upstream model as prior context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: ChatRole,
    pub content: String,
}

/// Outcome of one successful turn. Returned once and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    pub reply: String,
    pub emotion: Emotion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn message_serializes_timestamp_as_millis() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let msg = ChatMessage::user("你好", ts);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "你好");
        assert_eq!(json["timestamp"], 1_700_000_000_123_i64);
    }

    #[test]
    fn to_context_drops_timestamp() {
        let msg = ChatMessage::assistant("hi", Utc::now());
        let ctx = msg.to_context();
        assert_eq!(ctx.role, ChatRole::Assistant);
        assert_eq!(ctx.content, "hi");
    }
}
