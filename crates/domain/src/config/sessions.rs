use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session history windows & expiry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Maximum messages kept per session; oldest are trimmed first.
    #[serde(default = "d_20")]
    pub retention: usize,
    /// Most recent messages considered as model context for a new turn
    /// (the just-submitted user message counts toward this window).
    #[serde(default = "d_10")]
    pub context_window: usize,
    /// Drop sessions idle for this many minutes. `None` keeps sessions for
    /// the lifetime of the process.
    #[serde(default)]
    pub idle_minutes: Option<u32>,
    /// How often the idle sweep runs when `idle_minutes` is set.
    #[serde(default = "d_300")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            retention: 20,
            context_window: 10,
            idle_minutes: None,
            sweep_interval_secs: 300,
        }
    }
}

fn d_20() -> usize {
    20
}
fn d_10() -> usize {
    10
}
fn d_300() -> u64 {
    300
}
