//! OpenAI-compatible chat completions adapter.
//!
//! Targets OpenRouter by default, and works against any endpoint that
//! follows the `/chat/completions` contract.

use std::time::{Duration, Instant};

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
use crate::util::{from_reqwest, upstream_error_message};
use pc_domain::config::LlmConfig;
use pc_domain::error::{Error, Result};
use pc_domain::trace::TraceEvent;
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for an OpenAI-compatible endpoint.
///
/// Every request carries the bearer key plus the `HTTP-Referer` and
/// `X-Title` attribution headers OpenRouter uses for app rankings.
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    site_url: String,
    app_title: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider from the `[llm]` config section and a resolved key.
    pub fn from_config(cfg: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.provider_id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_model: cfg.default_model.clone(),
            site_url: cfg.site_url.clone(),
            app_title: cfg.app_title.clone(),
            client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    // ── Internal: build authenticated request builder ──────────────

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_title)
    }

    /// Resolve the effective model name for this request.
    fn effective_model(&self, req: &ChatRequest) -> String {
        req.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let mut body = serde_json::json!({
            "model": self.effective_model(req),
            "messages": req.messages,
        });

        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        if let Some(p) = req.top_p {
            body["top_p"] = serde_json::json!(p);
        }
        if let Some(fp) = req.frequency_penalty {
            body["frequency_penalty"] = serde_json::json!(fp);
        }
        if let Some(pp) = req.presence_penalty {
            body["presence_penalty"] = serde_json::json!(pp);
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(body: &Value, fallback_model: &str) -> ChatResponse {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first());

    // A choice without string content carries no reply.
    let content = choice
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let finish_reason = choice
        .and_then(|c| c.get("finish_reason"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or(fallback_model)
        .to_string();

    let usage = body.get("usage").and_then(parse_openai_usage);

    ChatResponse {
        content,
        usage,
        model,
        finish_reason,
    }
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

/// Classify a completed HTTP exchange. Non-success statuses and 200s that
/// carry an `error` envelope are both rejections.
fn interpret_response(status: u16, text: &str, fallback_model: &str) -> Result<ChatResponse> {
    let parsed: Option<Value> = serde_json::from_str(text).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(upstream_error_message)
            .unwrap_or_else(|| truncate(text, 500));
        return Err(Error::UpstreamRejected {
            status: Some(status),
            message,
        });
    }

    let Some(json) = parsed else {
        return Err(Error::UpstreamRejected {
            status: Some(status),
            message: format!("malformed response body: {}", truncate(text, 200)),
        });
    };

    if let Some(message) = upstream_error_message(&json) {
        return Err(Error::UpstreamRejected {
            status: None,
            message,
        });
    }

    Ok(parse_chat_response(&json, fallback_model))
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();
        let model = self.effective_model(req);
        let body = self.build_chat_body(req);

        tracing::debug!(provider = %self.id, url = %url, model = %model, "chat request");

        let started = Instant::now();
        let sent = self.authed_post(&url).json(&body).send().await;

        let resp = match sent {
            Ok(r) => r,
            Err(e) => {
                TraceEvent::LlmRequest {
                    provider: self.id.clone(),
                    model,
                    duration_ms: started.elapsed().as_millis() as u64,
                    status: None,
                    prompt_tokens: None,
                    completion_tokens: None,
                }
                .emit();
                return Err(from_reqwest(e));
            }
        };

        let status = resp.status().as_u16();
        let resp_text = resp.text().await.map_err(from_reqwest)?;
        let result = interpret_response(status, &resp_text, &model);

        let usage = result.as_ref().ok().and_then(|r| r.usage);
        TraceEvent::LlmRequest {
            provider: self.id.clone(),
            model,
            duration_ms: started.elapsed().as_millis() as u64,
            status: Some(status),
            prompt_tokens: usage.map(|u| u.prompt_tokens),
            completion_tokens: usage.map(|u| u.completion_tokens),
        }
        .emit();

        result
    }

    fn provider_id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
