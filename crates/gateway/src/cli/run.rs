//! `persona-chat run`: one-shot turn.
//!
//! Boots the same runtime as `serve` (minus the listener and background
//! tasks), runs a single turn through the orchestrator and prints the reply.

use std::sync::Arc;

use serde_json::json;

use pc_domain::config::Config;

use crate::bootstrap;

pub async fn run(
    config: Arc<Config>,
    message: String,
    character: String,
    session: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let session_id = session.unwrap_or_else(|| format!("cli-{}", uuid::Uuid::new_v4()));

    let result = state
        .orchestrator
        .submit_turn(&session_id, &character, &message)
        .await;

    match result {
        Ok(turn) if json_output => {
            let out = json!({
                "sessionId": session_id,
                "response": turn.reply,
                "emotion": turn.emotion,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        Ok(turn) => {
            println!("{}", turn.reply);
            eprintln!("[emotion: {}]", turn.emotion);
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("turn for session {session_id}"))),
    }
}
