use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upstream model API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the upstream chat-completion endpoint (OpenRouter by
/// default, any OpenAI-compatible API works).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Identifier used in logs and trace events.
    #[serde(default = "d_provider_id")]
    pub provider_id: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub default_model: String,
    /// Environment variable holding the bearer token. The key is required:
    /// startup aborts when the variable is unset or empty.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Sent as the `HTTP-Referer` header.
    #[serde(default = "d_site_url")]
    pub site_url: String,
    /// Sent as the `X-Title` header.
    #[serde(default = "d_app_title")]
    pub app_title: String,
    /// Global timeout for every upstream call.
    #[serde(default = "d_30000u")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_id: d_provider_id(),
            base_url: d_base_url(),
            default_model: d_model(),
            api_key_env: d_api_key_env(),
            site_url: d_site_url(),
            app_title: d_app_title(),
            timeout_ms: 30_000,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_provider_id() -> String {
    "openrouter".into()
}
fn d_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn d_model() -> String {
    "anthropic/claude-3-haiku".into()
}
fn d_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn d_site_url() -> String {
    "http://localhost:5173".into()
}
fn d_app_title() -> String {
    "AI Role-Playing Platform".into()
}
fn d_30000u() -> u64 {
    30_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
