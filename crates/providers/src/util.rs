//! Shared utility functions for provider adapters.

use pc_domain::config::LlmConfig;
use pc_domain::error::{Error, Result};
use serde_json::Value;

/// Convert a [`reqwest::Error`] raised while talking to the upstream into
/// the domain [`Error`] type. Timeouts, DNS failures and refused
/// connections all mean the call could not complete.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::UpstreamUnavailable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        Error::UpstreamUnavailable(format!("connection failed: {e}"))
    } else {
        Error::UpstreamUnavailable(e.to_string())
    }
}

/// Pull the human-readable reason out of an upstream error envelope.
///
/// Accepts both `{"error": {"message": "..."}}` and `{"error": "..."}`.
pub fn upstream_error_message(body: &Value) -> Option<String> {
    let err = body.get("error")?;
    match err {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => err
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .or_else(|| Some(err.to_string())),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Resolve the upstream API key from the environment variable named by
/// `cfg.api_key_env`.
pub fn resolve_api_key(cfg: &LlmConfig) -> Result<String> {
    resolve_api_key_with(cfg, |k| std::env::var(k).ok())
}

/// Like [`resolve_api_key`], with an injectable lookup.
pub fn resolve_api_key_with<F>(cfg: &LlmConfig, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&cfg.api_key_env) {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_owned()),
        _ => Err(Error::Config(format!(
            "{} environment variable is required",
            cfg.api_key_env
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_object_envelope() {
        let body = serde_json::json!({"error": {"message": "Invalid API key", "code": 401}});
        assert_eq!(upstream_error_message(&body).as_deref(), Some("Invalid API key"));
    }

    #[test]
    fn error_message_from_string_envelope() {
        let body = serde_json::json!({"error": "rate limited"});
        assert_eq!(upstream_error_message(&body).as_deref(), Some("rate limited"));
    }

    #[test]
    fn error_message_object_without_message_falls_back_to_json() {
        let body = serde_json::json!({"error": {"code": 500}});
        assert_eq!(upstream_error_message(&body).as_deref(), Some(r#"{"code":500}"#));
    }

    #[test]
    fn no_error_envelope() {
        let body = serde_json::json!({"choices": []});
        assert!(upstream_error_message(&body).is_none());
        assert!(upstream_error_message(&serde_json::json!({"error": null})).is_none());
    }

    #[test]
    fn api_key_present() {
        let cfg = LlmConfig::default();
        let key = resolve_api_key_with(&cfg, |k| {
            (k == "OPENROUTER_API_KEY").then(|| " sk-or-123 ".to_string())
        })
        .unwrap();
        assert_eq!(key, "sk-or-123");
    }

    #[test]
    fn api_key_missing_or_blank_is_config_error() {
        let cfg = LlmConfig::default();
        let err = resolve_api_key_with(&cfg, |_| None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));

        let err = resolve_api_key_with(&cfg, |_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn api_key_env_name_is_configurable() {
        let cfg = LlmConfig {
            api_key_env: "MY_LLM_KEY".into(),
            ..Default::default()
        };
        let key = resolve_api_key_with(&cfg, |k| (k == "MY_LLM_KEY").then(|| "k".into())).unwrap();
        assert_eq!(key, "k");
    }
}
