//! Retention and context windows over a session history.

use pc_domain::message::{ChatMessage, ContextEntry};

/// Trim `history` to at most `max` entries, removing from the head only.
/// Returns the number of entries removed.
pub fn trim_to_window<T>(history: &mut Vec<T>, max: usize) -> usize {
    let excess = history.len().saturating_sub(max);
    if excess > 0 {
        history.drain(..excess);
    }
    excess
}

/// Build the model context for a turn whose user message was just appended
/// as the last element of `history`.
///
/// Takes the last `window` messages, then drops that final user message, so
/// the result holds at most `window - 1` prior entries in original order.
pub fn context_window(history: &[ChatMessage], window: usize) -> Vec<ContextEntry> {
    let start = history.len().saturating_sub(window);
    let recent = &history[start..];
    let prior = match recent.split_last() {
        Some((_, rest)) => rest,
        None => recent,
    };
    prior.iter().map(ChatMessage::to_context).collect()
}
