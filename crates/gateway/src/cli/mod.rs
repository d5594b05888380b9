pub mod characters;
pub mod config;
pub mod doctor;
pub mod run;

use clap::{Parser, Subcommand};

use pc_domain::config::Config;

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "PC_CONFIG";

/// Persona Chat: an AI role-play chat backend.
#[derive(Debug, Parser)]
#[command(name = "persona-chat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// List the character catalog.
    Characters,
    /// Send a single message to a character and print the reply.
    Run {
        /// The message to send.
        message: String,
        /// Character id from the catalog.
        #[arg(long)]
        character: String,
        /// Session id (a fresh one is generated when omitted).
        #[arg(long)]
        session: Option<String>,
        /// Output the turn result as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `PC_CONFIG` (or `config.toml`),
/// then apply environment overrides. Returns the config and the path used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".into());
    let mut config = load_config_from(&config_path)?;
    config.apply_env_overrides(|k| std::env::var(k).ok());
    Ok((config, config_path))
}

/// Parse `path` if it exists, otherwise fall back to defaults.
pub fn load_config_from(path: &str) -> anyhow::Result<Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}
