//! Character catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pc_domain::character::CharacterQuery;

use super::error::ApiResult;
use crate::state::AppState;

const DEFAULT_FEATURED: usize = 6;

/// `GET /api/characters?category&search&page&limit`
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<CharacterQuery>,
) -> Json<Value> {
    let page = state.catalog.list(&query);
    Json(json!({
        "success": true,
        "characters": page.characters,
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "totalPages": page.total_pages,
    }))
}

/// `GET /api/characters/:id`
pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let character = state.catalog.get(&id)?;
    Ok(Json(json!({
        "success": true,
        "character": character,
    })))
}

/// `GET /api/characters/meta/categories`
pub async fn categories(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "categories": state.catalog.categories(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `GET /api/characters/meta/featured`
pub async fn featured(
    State(state): State<AppState>,
    Query(q): Query<FeaturedQuery>,
) -> Json<Value> {
    let n = q.limit.unwrap_or(DEFAULT_FEATURED);
    Json(json!({
        "success": true,
        "characters": state.catalog.featured(n),
    }))
}

/// `POST /api/characters/:id/like`. Nothing is persisted.
pub async fn like_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.catalog.get(&id)?;
    Ok(Json(json!({
        "success": true,
        "message": "liked",
        "liked": true,
    })))
}
