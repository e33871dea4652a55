//! Routes for the Character Catalogue bounded context.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storyloom_character::application::query_handlers::{self, CharacterView};
use storyloom_character::application::command_handlers;
use storyloom_character::domain::commands;
use storyloom_core::wire;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /create.
#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    /// Display name.
    pub name: String,
    /// Short handle.
    #[serde(default)]
    pub slug: String,
}

/// Response body for POST /create.
#[derive(Debug, Serialize)]
pub struct CreateCharacterResponse {
    /// The new character.
    #[serde(with = "wire::id")]
    pub character_id: i64,
}

/// Request body for POST /update. Empty fields keep the current value.
#[derive(Debug, Deserialize)]
pub struct UpdateCharacterRequest {
    /// The character to change.
    #[serde(with = "wire::id")]
    pub character_id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Short handle.
    #[serde(default)]
    pub slug: String,
    /// Display color.
    #[serde(default)]
    pub color: String,
    /// Emotion index to asset id.
    #[serde(with = "wire::id_values", default)]
    pub emotions: BTreeMap<i64, i64>,
}

/// POST /create
#[instrument(skip(state, request), fields(name = %request.name))]
async fn create_character(
    State(state): State<AppState>,
    Json(request): Json<CreateCharacterRequest>,
) -> Result<Json<CreateCharacterResponse>, ApiError> {
    let command = commands::CreateCharacter {
        correlation_id: Uuid::new_v4(),
        name: request.name,
        slug: request.slug,
    };

    info!(correlation_id = %command.correlation_id, "handling create_character command");

    let character_id =
        command_handlers::handle_create_character(&command, &state.ids, &*state.characters)
            .await?;

    Ok(Json(CreateCharacterResponse { character_id }))
}

/// POST /update
#[instrument(skip(state, request), fields(character_id = request.character_id))]
async fn update_character(
    State(state): State<AppState>,
    Json(request): Json<UpdateCharacterRequest>,
) -> Result<Json<CharacterView>, ApiError> {
    let command = commands::UpdateCharacter {
        correlation_id: Uuid::new_v4(),
        character_id: request.character_id,
        name: request.name,
        slug: request.slug,
        color: request.color,
        emotions: request.emotions,
    };

    info!(correlation_id = %command.correlation_id, "handling update_character command");

    let character = command_handlers::handle_update_character(&command, &*state.characters).await?;

    Ok(Json(character.into()))
}

/// GET /
async fn list_characters(
    State(state): State<AppState>,
) -> Result<Json<Vec<CharacterView>>, ApiError> {
    Ok(Json(query_handlers::get_characters(&*state.characters).await?))
}

/// Returns the router for the character context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_characters))
        .route("/create", post(create_character))
        .route("/update", post(update_character))
}
