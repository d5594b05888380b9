use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::OwnedSemaphorePermit;

use pc_domain::character::CharacterCatalog;
use pc_domain::config::SessionsConfig;
use pc_domain::emotion;
use pc_domain::error::{Error, Result};
use pc_domain::message::{ChatMessage, TurnResult};
use pc_domain::trace::TraceEvent;
use pc_providers::{GenerationOptions, ModelGateway};
use pc_sessions::{context_window, trim_to_window, ExpiryPolicy, HistoryStore};

use super::session_lock::SessionLockMap;

/// Window sizes applied to every turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnSettings {
    pub retention: usize,
    pub context_window: usize,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from_config(&SessionsConfig::default())
    }
}

impl TurnSettings {
    pub fn from_config(cfg: &SessionsConfig) -> Self {
        Self {
            retention: cfg.retention,
            context_window: cfg.context_window,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Runs one conversational turn end to end.
///
/// History for a session is only written after the model has replied, and
/// then as a single `[user, assistant]` append. A failed turn leaves the
/// session exactly as it was.
pub struct TurnOrchestrator {
    catalog: Arc<CharacterCatalog>,
    history: Arc<dyn HistoryStore>,
    gateway: ModelGateway,
    locks: Arc<SessionLockMap>,
    expiry: ExpiryPolicy,
    settings: TurnSettings,
}

impl TurnOrchestrator {
    pub fn new(
        catalog: Arc<CharacterCatalog>,
        history: Arc<dyn HistoryStore>,
        gateway: ModelGateway,
        locks: Arc<SessionLockMap>,
        expiry: ExpiryPolicy,
        settings: TurnSettings,
    ) -> Self {
        Self {
            catalog,
            history,
            gateway,
            locks,
            expiry,
            settings,
        }
    }

    /// Validate, generate, tag and commit one turn.
    pub async fn submit_turn(
        &self,
        session_id: &str,
        character_id: &str,
        user_message: &str,
    ) -> Result<TurnResult> {
        // Ids are opaque keys: blank ones are rejected, the rest pass through
        // untouched so history reads and clears hit the same entry.
        if [session_id, character_id, user_message]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(Error::InvalidRequest(
                "missing required fields: characterId, message, sessionId".into(),
            ));
        }
        let character = self.catalog.get(character_id)?;

        let _permit = self.lock_session(session_id).await?;

        let started = Instant::now();
        self.expiry.expire_if_stale(self.history.as_ref(), session_id, Utc::now());

        // Working copy: committed history plus the pending user message.
        let user_entry = ChatMessage::user(user_message, Utc::now());
        let mut working = self.history.get(session_id);
        working.push(user_entry.clone());
        trim_to_window(&mut working, self.settings.retention);
        let context = context_window(&working, self.settings.context_window);

        tracing::debug!(
            session_id,
            character_id,
            context_len = context.len(),
            "generating reply"
        );

        let reply = match self
            .gateway
            .generate_reply(
                &character.prompt_template,
                &context,
                user_message,
                Some(GenerationOptions::character()),
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    session_id,
                    character_id,
                    upstream = e.is_upstream(),
                    error = %e,
                    "reply generation failed"
                );
                TraceEvent::TurnFailed {
                    session_id: session_id.to_owned(),
                    character_id: character_id.to_owned(),
                    reason: e.to_string(),
                }
                .emit();
                return Err(Error::GenerationFailed(e.to_string()));
            }
        };

        let emotion = emotion::classify(&reply);
        let assistant_entry = ChatMessage::assistant(reply.clone(), Utc::now());
        let history_len = self.history.append(
            session_id,
            vec![user_entry, assistant_entry],
            self.settings.retention,
        );

        TraceEvent::TurnCompleted {
            session_id: session_id.to_owned(),
            character_id: character_id.to_owned(),
            emotion: emotion.as_str().to_owned(),
            history_len,
            context_len: context.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(TurnResult { reply, emotion })
    }

    /// Forget a session's history. Waits for an in-flight turn on the same
    /// session so its commit cannot land after the clear.
    pub async fn clear_session(&self, session_id: &str) -> Result<bool> {
        let _permit = self.lock_session(session_id).await?;
        let existed = self.history.clear(session_id);
        TraceEvent::SessionCleared {
            session_id: session_id.to_owned(),
            existed,
        }
        .emit();
        Ok(existed)
    }

    async fn lock_session(&self, session_id: &str) -> Result<OwnedSemaphorePermit> {
        self.locks
            .acquire(session_id)
            .await
            .map_err(|e| Error::GenerationFailed(e.to_string()))
    }

    /// Run the turn on its own task so it still commits if the caller is
    /// dropped mid-flight (e.g. the HTTP client disconnects).
    pub async fn submit_detached(
        self: &Arc<Self>,
        session_id: String,
        character_id: String,
        user_message: String,
    ) -> Result<TurnResult> {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.submit_turn(&session_id, &character_id, &user_message)
                .await
        });
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::GenerationFailed(format!("turn task aborted: {e}"))),
        }
    }
}
