mod characters;
mod llm;
mod observability;
mod server;
mod sessions;

pub use characters::*;
pub use llm::*;
pub use observability::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub characters: CharactersConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Environment overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Env var overriding `llm.base_url`.
pub const ENV_BASE_URL: &str = "OPENROUTER_BASE_URL";
/// Env var overriding `llm.default_model`.
pub const ENV_MODEL: &str = "OPENROUTER_MODEL";
/// Env var overriding `llm.site_url` (sent as `HTTP-Referer`).
pub const ENV_SITE_URL: &str = "SITE_URL";

impl Config {
    /// Apply environment overrides on top of file/default values.
    ///
    /// `lookup` is injected so tests don't have to mutate the process
    /// environment; production passes `|k| std::env::var(k).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_BASE_URL) {
            self.llm.base_url = v;
        }
        if let Some(v) = non_empty(ENV_MODEL) {
            self.llm.default_model = v;
        }
        if let Some(v) = non_empty(ENV_SITE_URL) {
            self.llm.site_url = v;
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good. The API key is not
    /// checked here; it is resolved (and required) when the provider is built.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |severity, field: &str, message: &str| {
            errors.push(ConfigError {
                severity,
                field: field.into(),
                message: message.into(),
            })
        };

        if self.server.port == 0 {
            push(ConfigSeverity::Error, "server.port", "port must be greater than 0");
        }
        if self.server.host.is_empty() {
            push(ConfigSeverity::Error, "server.host", "host must not be empty");
        }
        if self.server.max_concurrent_requests == 0 {
            push(
                ConfigSeverity::Error,
                "server.max_concurrent_requests",
                "concurrency limit must be greater than 0",
            );
        }
        if let Some(rl) = &self.server.rate_limit {
            if rl.requests_per_second == 0 || rl.burst_size == 0 {
                push(
                    ConfigSeverity::Error,
                    "server.rate_limit",
                    "requests_per_second and burst_size must be greater than 0",
                );
            }
        }

        if self.llm.base_url.trim().is_empty() {
            push(ConfigSeverity::Error, "llm.base_url", "base_url must not be empty");
        }
        if self.llm.default_model.trim().is_empty() {
            push(
                ConfigSeverity::Error,
                "llm.default_model",
                "default_model must not be empty",
            );
        }
        if self.llm.api_key_env.trim().is_empty() {
            push(
                ConfigSeverity::Error,
                "llm.api_key_env",
                "api_key_env must name an environment variable",
            );
        }
        if self.llm.timeout_ms == 0 {
            push(ConfigSeverity::Error, "llm.timeout_ms", "timeout must be greater than 0");
        }

        if self.sessions.retention == 0 {
            push(
                ConfigSeverity::Error,
                "sessions.retention",
                "retention window must be greater than 0",
            );
        }
        if self.sessions.context_window == 0 {
            push(
                ConfigSeverity::Error,
                "sessions.context_window",
                "context window must be greater than 0",
            );
        } else if self.sessions.context_window > self.sessions.retention {
            push(
                ConfigSeverity::Warning,
                "sessions.context_window",
                "context window is larger than the retention window and will never fill",
            );
        }
        if self.sessions.idle_minutes == Some(0) {
            push(
                ConfigSeverity::Error,
                "sessions.idle_minutes",
                "idle_minutes must be greater than 0 (omit it to disable expiry)",
            );
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            push(
                ConfigSeverity::Error,
                "observability.sample_rate",
                "sample_rate must be between 0.0 and 1.0",
            );
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            push(
                ConfigSeverity::Warning,
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            );
        }

        errors
    }
}
