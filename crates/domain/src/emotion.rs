//! Keyword-based emotion tagging for generated replies.
//!
//! Each non-neutral label owns a fixed set of trigger substrings (words and
//! emoji). Labels are checked in priority order and the first one with any
//! matching trigger wins. Matching is plain case-sensitive containment; the
//! text is never lowercased.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Thoughtful,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Thoughtful => "thoughtful",
            Emotion::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger table in priority order.
const TRIGGERS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Happy,
        &["开心", "高兴", "快乐", "兴奋", "愉快", "哈哈", "😊", "😄"],
    ),
    (
        Emotion::Sad,
        &["难过", "伤心", "沮丧", "失望", "痛苦", "😢", "😭"],
    ),
    (Emotion::Angry, &["生气", "愤怒", "恼火", "烦躁", "😠", "😡"]),
    (Emotion::Surprised, &["惊讶", "震惊", "意外", "😲", "😮"]),
    (
        Emotion::Thoughtful,
        &["思考", "考虑", "想想", "或许", "可能", "🤔"],
    ),
];

/// Classify `text` into a single coarse emotion label.
pub fn classify(text: &str) -> Emotion {
    first_match(text, TRIGGERS)
}

fn first_match(text: &str, table: &[(Emotion, &[&str])]) -> Emotion {
    table
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| text.contains(t)))
        .map(|(emotion, _)| *emotion)
        .unwrap_or(Emotion::Neutral)
}
