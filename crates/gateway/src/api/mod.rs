pub mod characters;
pub mod chat;
pub mod error;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router. Every route lives under `/api`.
pub fn router() -> Router<AppState> {
    let chat = Router::new()
        .route("/message", post(chat::send_message))
        .route(
            "/history/:session_id",
            get(chat::get_history).delete(chat::clear_history),
        )
        .route("/health", get(chat::health));

    let characters = Router::new()
        .route("/", get(characters::list_characters))
        .route("/meta/categories", get(characters::categories))
        .route("/meta/featured", get(characters::featured))
        .route("/:id", get(characters::get_character))
        .route("/:id/like", post(characters::like_character));

    Router::new().nest(
        "/api",
        Router::new()
            .nest("/chat", chat)
            .nest("/characters", characters),
    )
}
