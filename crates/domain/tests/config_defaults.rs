use std::collections::HashMap;

use pc_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3001);
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8080
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config.server.cors.allowed_origins.contains(&"http://localhost:*".to_string()));
    assert!(config.server.cors.allowed_origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn full_config_parses() {
    let toml_str = r#"
[llm]
default_model = "openai/gpt-4o-mini"
timeout_ms = 15000

[sessions]
retention = 40
context_window = 12
idle_minutes = 30

[characters]
path = "personas.toml"

[observability]
service_name = "chat-staging"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.llm.default_model, "openai/gpt-4o-mini");
    assert_eq!(config.llm.timeout_ms, 15_000);
    assert_eq!(config.sessions.retention, 40);
    assert_eq!(config.sessions.context_window, 12);
    assert_eq!(config.sessions.idle_minutes, Some(30));
    assert_eq!(
        config.characters.path.as_deref(),
        Some(std::path::Path::new("personas.toml"))
    );
    assert_eq!(config.observability.service_name, "chat-staging");
}

#[test]
fn default_config_is_valid() {
    let issues = Config::default().validate();
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
}

#[test]
fn validation_flags_bad_windows() {
    let mut config = Config::default();
    config.sessions.retention = 0;
    config.sessions.context_window = 0;
    let issues = config.validate();
    let fields: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .map(|i| i.field.as_str())
        .collect();
    assert!(fields.contains(&"sessions.retention"));
    assert!(fields.contains(&"sessions.context_window"));
}

#[test]
fn context_larger_than_retention_is_a_warning() {
    let mut config = Config::default();
    config.sessions.context_window = 50;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert_eq!(issues[0].field, "sessions.context_window");
}

#[test]
fn wildcard_cors_warns() {
    let mut config = Config::default();
    config.server.cors.allowed_origins = vec!["*".into()];
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Warning && i.field == "server.cors.allowed_origins"));
}

#[test]
fn env_overrides_apply_and_skip_empty_values() {
    let env: HashMap<&str, &str> = [
        ("OPENROUTER_BASE_URL", "http://127.0.0.1:9000/v1"),
        ("OPENROUTER_MODEL", "   "),
        ("SITE_URL", "https://chat.example.com"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(config.llm.base_url, "http://127.0.0.1:9000/v1");
    assert_eq!(config.llm.default_model, "anthropic/claude-3-haiku");
    assert_eq!(config.llm.site_url, "https://chat.example.com");
}
