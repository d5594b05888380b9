//! Chat API endpoints.
//!
//! - `POST   /api/chat/message`       run one turn
//! - `GET    /api/chat/history/:id`   committed history for a session
//! - `DELETE /api/chat/history/:id`   forget a session
//! - `GET    /api/chat/health`        upstream reachability

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Absent fields deserialize as empty strings so the orchestrator reports
/// them as one `InvalidRequest`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub character_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/chat/message
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;

    let result = state
        .orchestrator
        .submit_detached(body.session_id, body.character_id, body.message)
        .await?;

    Ok(Json(json!({
        "success": true,
        "response": result.reply,
        "emotion": result.emotion,
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// History
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    state
        .expiry
        .expire_if_stale(state.history.as_ref(), &session_id, Utc::now());
    let history = state.history.get(&session_id);

    Json(json!({
        "success": true,
        "history": history,
    }))
}

pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.orchestrator.clear_session(&session_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "history cleared",
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/chat/health
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let connected = state.gateway.health_check().await;

    Json(json!({
        "success": true,
        "status": if connected { "connected" } else { "disconnected" },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
