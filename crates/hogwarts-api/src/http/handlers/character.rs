//! Character handlers. Every route is scoped to the authenticated user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use hogwarts_types::character::{
    Character, CharacterId, CharacterListItem, CreateCharacterRequest, UpdateCharacterStateRequest,
};
use hogwarts_types::error::CharacterError;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// Unparseable ids cannot name an existing character.
fn parse_id(raw: &str) -> Result<CharacterId, AppError> {
    raw.parse::<CharacterId>()
        .map_err(|_| AppError::Character(CharacterError::NotFound))
}

/// POST /api/characters
pub async fn create_character(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(body): ApiJson<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let character = state.character_service.create(&auth.user_id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "character_id": character.id })),
    ))
}

/// GET /api/characters
pub async fn list_characters(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<CharacterListItem>>, AppError> {
    let characters = state.character_service.list(&auth.user_id).await?;
    Ok(Json(characters.iter().map(CharacterListItem::from).collect()))
}

/// GET /api/characters/{id}
pub async fn get_character(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Character>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.character_service.get(&auth.user_id, &id).await?))
}

/// PUT /api/characters/{id}/state
pub async fn update_character_state(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCharacterStateRequest>,
) -> Result<Json<Character>, AppError> {
    let id = parse_id(&id)?;
    let character = state
        .character_service
        .update_state(&auth.user_id, &id, body)
        .await?;
    Ok(Json(character))
}

/// DELETE /api/characters/{id}
pub async fn delete_character(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.character_service.delete(&auth.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
