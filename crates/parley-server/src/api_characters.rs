//! Character (persona) management handlers.

use crate::{api::ApiError, AppState};
use axum::extract::{Extension, Json, Path};
use parley_types::{NewPersona, Persona};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response body for a created character.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedCharacter {
    pub id: i64,
}

/// Handler for `GET /v1/characters/{character_id}`.
pub async fn get_character_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(character_id): Path<i64>,
) -> Result<Json<Persona>, ApiError> {
    let store = state.characters.clone();
    let persona = tokio::task::spawn_blocking(move || store.get(character_id))
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))??;

    persona
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("character {} does not exist", character_id)))
}

/// Handler for `GET /v1/characters`.
pub async fn list_characters_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Persona>>, ApiError> {
    let store = state.characters.clone();
    let personas = tokio::task::spawn_blocking(move || store.get_all())
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))??;

    Ok(Json(personas))
}

/// Handler for `POST /v1/characters`.
pub async fn add_character_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<NewPersona>,
) -> Result<Json<CreatedCharacter>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("character name must not be empty".to_string()));
    }

    let store = state.characters.clone();
    let id = tokio::task::spawn_blocking(move || store.add(&payload))
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))??;

    Ok(Json(CreatedCharacter { id }))
}
