use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Logging + OpenTelemetry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-field lines.
    Pretty,
}

/// Settings for the `serve` log pipeline.
///
/// `RUST_LOG`, when set, wins over `log_filter`. OTLP export is off unless
/// `otlp_endpoint` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "d_log_filter")]
    pub log_filter: String,
    #[serde(default = "d_log_format")]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint (e.g. `http://localhost:4317`).
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    /// `service.name` resource attribute reported to the collector.
    #[serde(default = "d_service_name")]
    pub service_name: String,
    /// Ratio-based sampling, `0.0..=1.0`.
    #[serde(default = "d_sample_rate")]
    pub sample_rate: f64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: d_log_filter(),
            log_format: d_log_format(),
            otlp_endpoint: None,
            service_name: d_service_name(),
            sample_rate: d_sample_rate(),
        }
    }
}

fn d_log_filter() -> String {
    "info,pc_gateway=debug".into()
}
fn d_log_format() -> LogFormat {
    LogFormat::Json
}
fn d_service_name() -> String {
    "persona-chat".into()
}
fn d_sample_rate() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg: ObservabilityConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.log_filter, "info,pc_gateway=debug");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.otlp_endpoint.is_none());
        assert_eq!(cfg.service_name, "persona-chat");
        assert!((cfg.sample_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pretty_logs_with_collector() {
        let cfg: ObservabilityConfig = toml::from_str(
            r#"
            log_format = "pretty"
            log_filter = "debug"
            otlp_endpoint = "http://localhost:4317"
            sample_rate = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
        assert!((cfg.sample_rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(toml::from_str::<ObservabilityConfig>(r#"log_format = "xml""#).is_err());
    }
}
