use pc_domain::error::Result;
use pc_domain::message::ChatRole;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl From<ChatRole> for PromptRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => PromptRole::User,
            ChatRole::Assistant => PromptRole::Assistant,
        }
    }
}

/// One entry of the `messages` array sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: PromptRole::System, content: text.into() }
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: PromptRole::User, content: text.into() }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: PromptRole::Assistant, content: text.into() }
    }
}

/// A provider-agnostic chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation messages to send.
    pub messages: Vec<PromptMessage>,
    /// Model identifier override. When `None`, the provider uses its default.
    pub model: Option<String>,
    /// Sampling temperature (0.0 – 2.0). `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` lets the provider choose.
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
}

/// Token usage reported by the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A provider-agnostic chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Text of the first completion choice. `None` when the upstream
    /// returned no choices at all.
    pub content: Option<String>,
    /// Token usage information.
    pub usage: Option<Usage>,
    /// The model that actually produced the response.
    pub model: String,
    /// The reason the model stopped generating (e.g. "stop", "length").
    pub finish_reason: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait that every upstream adapter must implement.
///
/// Errors must already be classified: transport failures as
/// `UpstreamUnavailable`, non-success statuses and error envelopes as
/// `UpstreamRejected`.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and wait for the full response.
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;

    /// Model used when a request does not name one.
    fn default_model(&self) -> &str;
}
