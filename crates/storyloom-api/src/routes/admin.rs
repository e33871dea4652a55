//! Routes for admin onboarding, authorization and inboxes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storyloom_core::wire::{self, parse_id};
use storyloom_moderation::application::command_handlers;
use storyloom_moderation::application::query_handlers::{self, AdminView, RequestView};
use storyloom_moderation::domain::aggregates::DISABLED_ADMIN_STATUS;
use storyloom_moderation::domain::commands;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// Request body for POST /register.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Credential.
    pub password: String,
}

/// Response body for POST /register.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The new admin.
    #[serde(with = "wire::id")]
    pub admin_id: i64,
}

/// Request body for POST /authorize.
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    /// Login email.
    pub email: String,
    /// Credential.
    pub password: String,
}

/// Request body for POST /change. Empty strings and absent fields are left
/// unchanged.
#[derive(Debug, Deserialize)]
pub struct ChangeRequest {
    /// The admin to change.
    #[serde(with = "wire::id")]
    pub admin_id: i64,
    /// New display name.
    #[serde(default)]
    pub name: String,
    /// New login email.
    #[serde(default)]
    pub email: String,
    /// New credential.
    #[serde(default)]
    pub password: String,
    /// New approval state.
    #[serde(default)]
    pub admin_status: Option<i32>,
    /// Replacement list of created chapters.
    #[serde(default)]
    pub created_chapters: Option<Vec<String>>,
}

/// POST /register
#[instrument(skip(state, request), fields(email = %request.email))]
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let command = commands::RegisterAdmin {
        correlation_id: Uuid::new_v4(),
        email: request.email,
        name: request.name,
        password: request.password,
    };

    info!(correlation_id = %command.correlation_id, "handling register_admin command");

    let admin_id =
        command_handlers::handle_register_admin(&command, &state.ids, state.moderation()).await?;

    Ok(Json(RegisterResponse { admin_id }))
}

/// POST /authorize
///
/// Answers 403 for an admin whose registration is still awaiting approval.
#[instrument(skip(state, request), fields(email = %request.email))]
async fn authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<Response, ApiError> {
    let admin =
        query_handlers::authorize_admin(&request.email, &request.password, &*state.admins).await?;

    if admin.admin_status == DISABLED_ADMIN_STATUS {
        info!(admin_id = admin.admin_id, "authorization refused for disabled admin");
        let body = ErrorBody {
            error: "admin_disabled",
            message: format!("admin {} is awaiting approval", admin.admin_id),
        };
        return Ok((StatusCode::FORBIDDEN, Json(body)).into_response());
    }

    Ok(Json(admin).into_response())
}

/// POST /change
#[instrument(skip(state, request), fields(admin_id = request.admin_id))]
async fn change(
    State(state): State<AppState>,
    Json(request): Json<ChangeRequest>,
) -> Result<Json<AdminView>, ApiError> {
    let created_chapters = request
        .created_chapters
        .map(|ids| ids.iter().map(|id| parse_id(id)).collect::<Result<Vec<_>, _>>())
        .transpose()?;

    let command = commands::ChangeAdmin {
        correlation_id: Uuid::new_v4(),
        admin_id: request.admin_id,
        name: request.name,
        email: request.email,
        password: request.password,
        admin_status: request.admin_status,
        created_chapters,
    };

    info!(correlation_id = %command.correlation_id, "handling change_admin command");

    let admin = command_handlers::handle_change_admin(&command, state.moderation()).await?;

    Ok(Json(admin.into()))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_admin(
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
) -> Result<Json<AdminView>, ApiError> {
    let admin_id = parse_id(&admin_id)?;
    let admin = query_handlers::get_admin_by_id(admin_id, &*state.admins).await?;
    Ok(Json(admin))
}

/// GET /{id}/inbox
#[instrument(skip(state))]
async fn get_inbox(
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
) -> Result<Json<Vec<RequestView>>, ApiError> {
    let admin_id = parse_id(&admin_id)?;
    let inbox = query_handlers::get_inbox(admin_id, &*state.admins, &*state.requests).await?;
    Ok(Json(inbox))
}

/// Returns the router for admin endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/authorize", post(authorize))
        .route("/change", post(change))
        .route("/{id}", get(get_admin))
        .route("/{id}/inbox", get(get_inbox))
}
