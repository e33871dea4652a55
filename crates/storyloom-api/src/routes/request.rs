//! Routes for review requests.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storyloom_core::wire::{self, parse_id};
use storyloom_moderation::application::command_handlers;
use storyloom_moderation::application::query_handlers::{self, RequestView};
use storyloom_moderation::domain::commands;
use storyloom_moderation::domain::request::RequestType;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /create.
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// The originating admin.
    #[serde(with = "wire::id")]
    pub requesting_admin_id: i64,
    /// Request discriminator.
    pub request_type: RequestType,
    /// Chapter to submit for review, if any.
    #[serde(with = "wire::opt_id", default)]
    pub requested_chapter_id: Option<i64>,
}

/// Response body for POST /create.
#[derive(Debug, Serialize)]
pub struct CreateRequestResponse {
    /// The new request.
    #[serde(with = "wire::id")]
    pub request_id: i64,
}

/// POST /create
#[instrument(skip(state, body), fields(requesting_admin_id = body.requesting_admin_id))]
async fn create_request(
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<CreateRequestResponse>, ApiError> {
    let command = commands::CreateRequest {
        correlation_id: Uuid::new_v4(),
        requesting_admin_id: body.requesting_admin_id,
        request_type: body.request_type,
        requested_chapter_id: body.requested_chapter_id,
    };

    info!(correlation_id = %command.correlation_id, "handling create_request command");

    let request_id =
        command_handlers::handle_create_request(&command, &state.ids, state.moderation()).await?;

    Ok(Json(CreateRequestResponse { request_id }))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<RequestView>, ApiError> {
    let request_id = parse_id(&request_id)?;
    let request = query_handlers::get_request_by_id(request_id, &*state.requests).await?;
    Ok(Json(request))
}

/// Returns the router for request endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_request))
        .route("/{id}", get(get_request))
}
