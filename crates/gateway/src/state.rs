use std::sync::Arc;

use pc_domain::character::CharacterCatalog;
use pc_domain::config::Config;
use pc_providers::ModelGateway;
use pc_sessions::{ExpiryPolicy, HistoryStore};

use crate::runtime::session_lock::SessionLockMap;
use crate::runtime::TurnOrchestrator;

/// Shared application state passed to all API handlers.
///
/// Every field is cheap to clone; the orchestrator holds its own handles
/// to the catalog, store, gateway and locks.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub catalog: Arc<CharacterCatalog>,
    pub gateway: ModelGateway,

    // ── Session management ────────────────────────────────────────────
    pub history: Arc<dyn HistoryStore>,
    pub session_locks: Arc<SessionLockMap>,
    pub expiry: ExpiryPolicy,

    // ── Runtime ───────────────────────────────────────────────────────
    pub orchestrator: Arc<TurnOrchestrator>,
}
