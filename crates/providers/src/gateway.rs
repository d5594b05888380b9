//! Model gateway: the single component that turns a prompt and history into
//! one upstream call and hands back the reply text.

use std::sync::Arc;

use pc_domain::error::{Error, Result};
use pc_domain::message::ContextEntry;

use crate::traits::{ChatRequest, LlmProvider, PromptMessage};

const HEALTH_PROBE: &str = "Hello, this is a test message.";
const HEALTH_PROBE_MAX_TOKENS: u32 = 10;

/// Sampling overrides for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Overrides the provider's default model.
    pub model: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            model: None,
        }
    }
}

impl GenerationOptions {
    /// Defaults for in-character replies.
    pub fn character() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 500,
            model: None,
        }
    }
}

/// Stateless wrapper over an [`LlmProvider`].
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn LlmProvider>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    pub fn default_model(&self) -> &str {
        self.provider.default_model()
    }

    /// Send `messages` as-is and return the first choice's text.
    pub async fn chat(
        &self,
        messages: Vec<PromptMessage>,
        options: GenerationOptions,
    ) -> Result<String> {
        let req = ChatRequest {
            messages,
            model: options.model,
            temperature: Some(options.temperature),
            max_tokens: Some(options.max_tokens),
            top_p: Some(1.0),
            frequency_penalty: Some(0.0),
            presence_penalty: Some(0.0),
        };

        let resp = self.provider.chat(&req).await?;
        resp.content.ok_or(Error::EmptyCompletion)
    }

    /// Produce a persona reply: one system entry, then `history` in order,
    /// then `user_message` last.
    pub async fn generate_reply(
        &self,
        system_prompt: &str,
        history: &[ContextEntry],
        user_message: &str,
        options: Option<GenerationOptions>,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(PromptMessage::system(system_prompt));
        messages.extend(history.iter().map(|e| PromptMessage {
            role: e.role.into(),
            content: e.content.clone(),
        }));
        messages.push(PromptMessage::user(user_message));

        self.chat(messages, options.unwrap_or_else(GenerationOptions::character))
            .await
    }

    /// Probe the upstream with a tiny request. Never errors.
    pub async fn health_check(&self) -> bool {
        let options = GenerationOptions {
            max_tokens: HEALTH_PROBE_MAX_TOKENS,
            ..Default::default()
        };
        match self.chat(vec![PromptMessage::user(HEALTH_PROBE)], options).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(provider = %self.provider_id(), error = %e, "upstream health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatResponse, PromptRole};
    use pc_domain::message::ChatRole;
    use parking_lot::Mutex;

    /// Replays canned outcomes and records every request it sees.
    struct ScriptedProvider {
        outcomes: Mutex<Vec<Result<Option<String>>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(outcomes: Vec<Result<Option<String>>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
            self.seen.lock().push(req.clone());
            let next = self.outcomes.lock().remove(0);
            next.map(|content| ChatResponse {
                content,
                usage: None,
                model: "scripted".into(),
                finish_reason: Some("stop".into()),
            })
        }
        fn provider_id(&self) -> &str {
            "scripted"
        }
        fn default_model(&self) -> &str {
            "scripted-model"
        }
    }

    #[tokio::test]
    async fn reply_request_is_system_then_history_then_user() {
        let provider = ScriptedProvider::new(vec![Ok(Some("Hi there".into()))]);
        let gateway = ModelGateway::new(provider.clone());

        let history = vec![
            ContextEntry { role: ChatRole::User, content: "earlier".into() },
            ContextEntry { role: ChatRole::Assistant, content: "reply".into() },
        ];
        let text = gateway
            .generate_reply("You are Socrates.", &history, "What is virtue?", None)
            .await
            .unwrap();
        assert_eq!(text, "Hi there");

        let seen = provider.seen.lock();
        let msgs = &seen[0].messages;
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[0].role, PromptRole::System);
        assert_eq!(msgs[0].content, "You are Socrates.");
        assert_eq!(msgs[1].role, PromptRole::User);
        assert_eq!(msgs[2].role, PromptRole::Assistant);
        assert_eq!(msgs[3].role, PromptRole::User);
        assert_eq!(msgs[3].content, "What is virtue?");
        assert_eq!(
            msgs.iter().filter(|m| m.role == PromptRole::System).count(),
            1
        );
    }

    #[tokio::test]
    async fn character_defaults_and_fixed_penalties() {
        let provider = ScriptedProvider::new(vec![Ok(Some("ok".into()))]);
        let gateway = ModelGateway::new(provider.clone());
        gateway.generate_reply("p", &[], "hi", None).await.unwrap();

        let req = provider.seen.lock()[0].clone();
        assert_eq!(req.temperature, Some(0.8));
        assert_eq!(req.max_tokens, Some(500));
        assert_eq!(req.top_p, Some(1.0));
        assert_eq!(req.frequency_penalty, Some(0.0));
        assert_eq!(req.presence_penalty, Some(0.0));
        assert!(req.model.is_none());
    }

    #[tokio::test]
    async fn explicit_options_override_defaults() {
        let provider = ScriptedProvider::new(vec![Ok(Some("ok".into()))]);
        let gateway = ModelGateway::new(provider.clone());
        let opts = GenerationOptions {
            temperature: 0.2,
            max_tokens: 64,
            model: Some("openai/gpt-4o-mini".into()),
        };
        gateway.generate_reply("p", &[], "hi", Some(opts)).await.unwrap();

        let req = provider.seen.lock()[0].clone();
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.max_tokens, Some(64));
        assert_eq!(req.model.as_deref(), Some("openai/gpt-4o-mini"));
    }

    #[tokio::test]
    async fn missing_choices_is_empty_completion() {
        let gateway = ModelGateway::new(ScriptedProvider::new(vec![Ok(None)]));
        let err = gateway.generate_reply("p", &[], "hi", None).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let gateway = ModelGateway::new(ScriptedProvider::new(vec![Err(
            Error::UpstreamUnavailable("connection refused".into()),
        )]));
        let err = gateway.generate_reply("p", &[], "hi", None).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn health_check_probe_shape_and_outcomes() {
        let provider = ScriptedProvider::new(vec![
            Ok(Some("hi".into())),
            Err(Error::UpstreamRejected {
                status: Some(401),
                message: "bad key".into(),
            }),
        ]);
        let gateway = ModelGateway::new(provider.clone());

        assert!(gateway.health_check().await);
        assert!(!gateway.health_check().await);

        let seen = provider.seen.lock();
        assert_eq!(seen[0].messages.len(), 1);
        assert_eq!(seen[0].messages[0].content, HEALTH_PROBE);
        assert_eq!(seen[0].max_tokens, Some(10));
        assert_eq!(seen[0].temperature, Some(0.7));
    }
}
