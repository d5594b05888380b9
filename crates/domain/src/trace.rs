use serde::Serialize;

/// Structured trace events emitted across all persona-chat crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    LlmRequest {
        provider: String,
        model: String,
        duration_ms: u64,
        status: Option<u16>,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    TurnCompleted {
        session_id: String,
        character_id: String,
        emotion: String,
        history_len: usize,
        context_len: usize,
        duration_ms: u64,
    },
    TurnFailed {
        session_id: String,
        character_id: String,
        reason: String,
    },
    SessionCleared {
        session_id: String,
        existed: bool,
    },
    SessionsPruned {
        removed: usize,
        remaining: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "pc_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::SessionCleared {
            session_id: "abc".into(),
            existed: false,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "SessionCleared");
        assert_eq!(v["session_id"], "abc");
        assert_eq!(v["existed"], false);
    }
}
