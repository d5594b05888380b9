//! AppState construction and background-task spawning extracted from `main.rs`.
//!
//! `serve`, `run` and `doctor` share these so they boot the same runtime,
//! with or without an HTTP listener.

use std::sync::Arc;

use anyhow::Context;

use pc_domain::character::CharacterCatalog;
use pc_domain::config::{Config, ConfigSeverity};
use pc_providers::util::resolve_api_key;
use pc_providers::{LlmProvider, ModelGateway, OpenAiCompatProvider};
use pc_sessions::{ExpiryPolicy, HistoryStore, InMemoryHistoryStore};

use crate::runtime::session_lock::SessionLockMap;
use crate::runtime::{TurnOrchestrator, TurnSettings};
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`]. A missing API key is fatal.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Character catalog ────────────────────────────────────────────
    let catalog = Arc::new(load_catalog(&config)?);

    // ── Upstream provider ────────────────────────────────────────────
    let api_key = resolve_api_key(&config.llm).context("resolving upstream API key")?;
    let provider = OpenAiCompatProvider::from_config(&config.llm, api_key)
        .context("initializing upstream provider")?;
    tracing::info!(
        provider = %config.llm.provider_id,
        base_url = %config.llm.base_url,
        model = %config.llm.default_model,
        timeout_ms = config.llm.timeout_ms,
        "upstream provider ready"
    );

    Ok(assemble_state(config, catalog, Arc::new(provider)))
}

/// Wire the runtime around an already-built provider. Used by
/// [`build_app_state`] and by tests that substitute a fake upstream.
pub fn assemble_state(
    config: Arc<Config>,
    catalog: Arc<CharacterCatalog>,
    provider: Arc<dyn LlmProvider>,
) -> AppState {
    let gateway = ModelGateway::new(provider);

    // ── Session management ───────────────────────────────────────────
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let session_locks = Arc::new(SessionLockMap::new());
    let expiry = ExpiryPolicy::from_config(&config.sessions);
    let settings = TurnSettings::from_config(&config.sessions);
    tracing::info!(
        retention = settings.retention,
        context_window = settings.context_window,
        idle_minutes = ?config.sessions.idle_minutes,
        "session management ready"
    );

    // ── Orchestrator ─────────────────────────────────────────────────
    let orchestrator = Arc::new(TurnOrchestrator::new(
        catalog.clone(),
        history.clone(),
        gateway.clone(),
        session_locks.clone(),
        expiry,
        settings,
    ));

    AppState {
        config,
        catalog,
        gateway,
        history,
        session_locks,
        expiry,
        orchestrator,
    }
}

/// Built-in personas unless `[characters] path` points at a TOML catalog.
pub fn load_catalog(config: &Config) -> anyhow::Result<CharacterCatalog> {
    let catalog = match &config.characters.path {
        Some(path) => CharacterCatalog::load(path)
            .with_context(|| format!("loading characters from {}", path.display()))?,
        None => CharacterCatalog::builtin(),
    };
    tracing::info!(characters = catalog.len(), "character catalog loaded");
    Ok(catalog)
}

/// Spawn the long-running background tasks (idle-session sweep, lock
/// pruning). CLI one-shot commands skip this.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic idle-session sweep ──────────────────────────────────
    if state.expiry.is_enabled() {
        let history = state.history.clone();
        let expiry = state.expiry;
        let every = std::time::Duration::from_secs(state.config.sessions.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                expiry.sweep(history.as_ref(), chrono::Utc::now());
            }
        });
        tracing::info!(interval_secs = every.as_secs(), "idle-session sweep enabled");
    }

    // ── Periodic session lock pruning ────────────────────────────────
    {
        let session_locks = state.session_locks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let pruned = session_locks.prune_idle();
                if pruned > 0 {
                    tracing::debug!(pruned, "idle session locks pruned");
                }
            }
        });
    }
}
