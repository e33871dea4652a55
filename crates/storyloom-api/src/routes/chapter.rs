//! Routes for the Chapter Authoring bounded context.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use storyloom_authoring::application::query_handlers::{ChapterView, NodeView};
use storyloom_authoring::application::{command_handlers, query_handlers};
use storyloom_authoring::domain::aggregates::{Branching, EndInfo, NodeEvent};
use storyloom_authoring::domain::commands;
use storyloom_authoring::domain::status::ChapterStatus;
use storyloom_core::wire::{self, parse_id};
use storyloom_moderation::application::command_handlers as moderation_commands;
use storyloom_moderation::application::query_handlers as moderation_queries;
use storyloom_moderation::domain::commands::RequestChapterPublication;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /create.
#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    /// The authoring admin.
    #[serde(with = "wire::id")]
    pub author_id: i64,
}

/// Response body for POST /create.
#[derive(Debug, Serialize)]
pub struct CreateChapterResponse {
    /// The new chapter.
    #[serde(with = "wire::id")]
    pub chapter_id: i64,
    /// Its root node.
    #[serde(with = "wire::id")]
    pub start_node_id: i64,
}

/// Request body for POST /update.
#[derive(Debug, Deserialize)]
pub struct UpdateChapterRequest {
    /// The chapter to replace.
    #[serde(with = "wire::id")]
    pub chapter_id: i64,
    /// New display name.
    #[serde(default)]
    pub name: String,
    /// New node list.
    #[serde(with = "wire::ids", default)]
    pub node_ids: Vec<i64>,
    /// New character list.
    #[serde(with = "wire::ids", default)]
    pub character_ids: Vec<i64>,
    /// The editing admin.
    #[serde(with = "wire::id")]
    pub author_id: i64,
    /// New entry node, `0` for none.
    #[serde(with = "wire::id", default)]
    pub start_node: i64,
    /// New status code; absent keeps the current one.
    #[serde(default)]
    pub status: Option<ChapterStatus>,
}

/// Request body for POST /by-user.
#[derive(Debug, Deserialize)]
pub struct ChaptersByUserRequest {
    /// An admin or player id.
    #[serde(with = "wire::id")]
    pub user_id: i64,
}

/// Request body for POST /nodes/create.
#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    /// The owning chapter.
    #[serde(with = "wire::id")]
    pub chapter_id: i64,
    /// Human label.
    #[serde(default)]
    pub slug: String,
}

/// Response body for POST /nodes/create.
#[derive(Debug, Serialize)]
pub struct CreateNodeResponse {
    /// The new node.
    #[serde(with = "wire::id")]
    pub node_id: i64,
}

/// Request body for POST /nodes/update.
#[derive(Debug, Deserialize)]
pub struct UpdateNodeRequest {
    /// The node to replace.
    #[serde(with = "wire::id")]
    pub node_id: i64,
    /// Human label.
    #[serde(default)]
    pub slug: String,
    /// Events by position.
    #[serde(default)]
    pub events: BTreeMap<i32, NodeEvent>,
    /// Decision structure.
    #[serde(default)]
    pub branching: Branching,
    /// Ending marker.
    #[serde(default)]
    pub end: EndInfo,
    /// Author note.
    #[serde(default)]
    pub comment: String,
}

/// Request body for POST /publish.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// The submitting admin.
    #[serde(with = "wire::id")]
    pub admin_id: i64,
    /// The chapter to submit.
    #[serde(with = "wire::id")]
    pub chapter_id: i64,
}

/// Response body for POST /publish.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// The review request created for the chapter.
    #[serde(with = "wire::id")]
    pub request_id: i64,
}

/// POST /create
#[instrument(skip(state, request), fields(author_id = request.author_id))]
async fn create_chapter(
    State(state): State<AppState>,
    Json(request): Json<CreateChapterRequest>,
) -> Result<Json<CreateChapterResponse>, ApiError> {
    let command = commands::CreateDefaultChapter {
        correlation_id: Uuid::new_v4(),
        author_id: request.author_id,
    };

    info!(correlation_id = %command.correlation_id, "handling create_default_chapter command");

    let created = command_handlers::handle_create_default_chapter(
        &command,
        state.clock.as_ref(),
        &state.ids,
        &*state.chapters,
        &*state.nodes,
    )
    .await?;

    Ok(Json(CreateChapterResponse {
        chapter_id: created.chapter_id,
        start_node_id: created.start_node_id,
    }))
}

/// POST /update
#[instrument(skip(state, request), fields(chapter_id = request.chapter_id))]
async fn update_chapter(
    State(state): State<AppState>,
    Json(request): Json<UpdateChapterRequest>,
) -> Result<Json<ChapterView>, ApiError> {
    let command = commands::UpdateChapter {
        correlation_id: Uuid::new_v4(),
        chapter_id: request.chapter_id,
        name: request.name,
        node_ids: request.node_ids,
        character_ids: request.character_ids,
        author_id: request.author_id,
        start_node: request.start_node,
        status: request.status,
    };

    info!(correlation_id = %command.correlation_id, "handling update_chapter command");

    let chapter = command_handlers::handle_update_chapter(
        &command,
        state.clock.as_ref(),
        &*state.chapters,
        &*state.nodes,
    )
    .await?;

    Ok(Json(chapter.into()))
}

/// POST /by-user
#[instrument(skip(state, request), fields(user_id = request.user_id))]
async fn chapters_by_user(
    State(state): State<AppState>,
    Json(request): Json<ChaptersByUserRequest>,
) -> Result<Json<Vec<ChapterView>>, ApiError> {
    let chapters = moderation_queries::get_chapters_for_user(
        request.user_id,
        &*state.admins,
        &*state.players,
        &*state.chapters,
    )
    .await?;
    Ok(Json(chapters))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_chapter(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> Result<Json<ChapterView>, ApiError> {
    let chapter_id = parse_id(&chapter_id)?;
    let chapter = query_handlers::get_chapter_by_id(chapter_id, &*state.chapters).await?;
    Ok(Json(chapter))
}

/// GET /{id}/nodes
#[instrument(skip(state))]
async fn get_chapter_nodes(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<NodeView>>, ApiError> {
    let chapter_id = parse_id(&chapter_id)?;
    let nodes =
        query_handlers::get_chapter_nodes(chapter_id, &*state.chapters, &*state.nodes).await?;
    Ok(Json(nodes))
}

/// POST /nodes/create
#[instrument(skip(state, request), fields(chapter_id = request.chapter_id))]
async fn create_node(
    State(state): State<AppState>,
    Json(request): Json<CreateNodeRequest>,
) -> Result<Json<CreateNodeResponse>, ApiError> {
    let command = commands::CreateNode {
        correlation_id: Uuid::new_v4(),
        chapter_id: request.chapter_id,
        slug: request.slug,
    };

    info!(correlation_id = %command.correlation_id, "handling create_node command");

    let node_id = command_handlers::handle_create_node(
        &command,
        &state.ids,
        &*state.chapters,
        &*state.nodes,
    )
    .await?;

    Ok(Json(CreateNodeResponse { node_id }))
}

/// POST /nodes/update
#[instrument(skip(state, request), fields(node_id = request.node_id))]
async fn update_node(
    State(state): State<AppState>,
    Json(request): Json<UpdateNodeRequest>,
) -> Result<Json<NodeView>, ApiError> {
    let command = commands::UpdateNode {
        correlation_id: Uuid::new_v4(),
        node_id: request.node_id,
        slug: request.slug,
        events: request.events,
        branching: request.branching,
        end: request.end,
        comment: request.comment,
    };

    info!(correlation_id = %command.correlation_id, "handling update_node command");

    let node = command_handlers::handle_update_node(&command, &*state.nodes).await?;

    Ok(Json(node.into()))
}

/// GET /nodes/{id}
#[instrument(skip(state))]
async fn get_node(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<NodeView>, ApiError> {
    let node_id = parse_id(&node_id)?;
    let node = query_handlers::get_node_by_id(node_id, &*state.nodes).await?;
    Ok(Json(node))
}

/// POST /publish
#[instrument(skip(state, request), fields(chapter_id = request.chapter_id))]
async fn publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let command = RequestChapterPublication {
        correlation_id: Uuid::new_v4(),
        admin_id: request.admin_id,
        chapter_id: request.chapter_id,
    };

    info!(correlation_id = %command.correlation_id, "handling request_chapter_publication command");

    let request_id = moderation_commands::handle_request_chapter_publication(
        &command,
        &state.ids,
        state.moderation(),
    )
    .await?;

    Ok(Json(PublishResponse { request_id }))
}

/// Returns the router for the authoring context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_chapter))
        .route("/update", post(update_chapter))
        .route("/by-user", post(chapters_by_user))
        .route("/publish", post(publish))
        .route("/nodes/create", post(create_node))
        .route("/nodes/update", post(update_node))
        .route("/nodes/{id}", get(get_node))
        .route("/{id}", get(get_chapter))
        .route("/{id}/nodes", get(get_chapter_nodes))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use storyloom_core::repository::Repository;
    use storyloom_moderation::domain::aggregates::{Admin, Player};

    use super::*;
    use crate::routes::testing::{send, test_state};

    async fn create(state: &AppState, author: &str) -> Value {
        let app = router().with_state(state.clone());
        let (status, json) = send(
            app,
            "POST",
            "/create",
            Some(json!({ "author_id": author })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    #[tokio::test]
    async fn test_create_chapter_returns_chapter_rooted_at_its_node() {
        // Arrange
        let state = test_state();

        // Act
        let created = create(&state, "7").await;

        // Assert
        let chapter_id = created["chapter_id"].as_str().unwrap();
        let start_node_id = created["start_node_id"].as_str().unwrap();

        let app = router().with_state(state.clone());
        let (status, chapter) = send(app, "GET", &format!("/{chapter_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chapter["start_node"], start_node_id);
        assert_eq!(chapter["nodes"], json!([start_node_id]));
        assert_eq!(chapter["author"], "7");
        assert_eq!(chapter["status"], 1);

        let app = router().with_state(state);
        let (status, node) = send(app, "GET", &format!("/nodes/{start_node_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(node["chapter_id"], chapter_id);
    }

    #[tokio::test]
    async fn test_create_node_appends_to_chapter() {
        // Arrange
        let state = test_state();
        let created = create(&state, "7").await;
        let chapter_id = created["chapter_id"].as_str().unwrap().to_owned();

        // Act
        let app = router().with_state(state.clone());
        let (status, json) = send(
            app,
            "POST",
            "/nodes/create",
            Some(json!({ "chapter_id": chapter_id, "slug": "fork" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let node_id = json["node_id"].as_str().unwrap();
        let app = router().with_state(state);
        let (_, nodes) = send(app, "GET", &format!("/{chapter_id}/nodes"), None).await;
        let slugs: Vec<&str> = nodes
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["", "fork"]);
        assert_eq!(nodes[1]["node_id"], node_id);
    }

    #[tokio::test]
    async fn test_create_node_in_unknown_chapter_returns_404() {
        let app = router().with_state(test_state());

        let (status, json) = send(
            app,
            "POST",
            "/nodes/create",
            Some(json!({ "chapter_id": "999", "slug": "lost" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_update_chapter_renames_and_keeps_status() {
        // Arrange
        let state = test_state();
        let created = create(&state, "7").await;

        // Act
        let app = router().with_state(state);
        let (status, json) = send(
            app,
            "POST",
            "/update",
            Some(json!({
                "chapter_id": created["chapter_id"],
                "name": "The Descent",
                "node_ids": [created["start_node_id"]],
                "author_id": "7",
                "start_node": created["start_node_id"],
            })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "The Descent");
        assert_eq!(json["status"], 1);
        assert_eq!(json["version"], 3);
    }

    #[tokio::test]
    async fn test_update_chapter_with_unknown_status_returns_422() {
        let state = test_state();
        let created = create(&state, "7").await;

        let app = router().with_state(state);
        let (status, _) = send(
            app,
            "POST",
            "/update",
            Some(json!({
                "chapter_id": created["chapter_id"],
                "author_id": "7",
                "status": 9,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_node_replaces_content() {
        // Arrange
        let state = test_state();
        let created = create(&state, "7").await;

        // Act
        let app = router().with_state(state);
        let (status, json) = send(
            app,
            "POST",
            "/nodes/update",
            Some(json!({
                "node_id": created["start_node_id"],
                "slug": "opening",
                "events": { "0": { "kind": "dialogue", "data": { "line": "Hello" } } },
                "comment": "first beat",
            })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["slug"], "opening");
        assert_eq!(json["events"]["0"]["kind"], "dialogue");
        assert_eq!(json["comment"], "first beat");
    }

    #[tokio::test]
    async fn test_publish_moves_chapter_into_review() {
        // Arrange
        let state = test_state();
        let mut reviewer = Admin::new(1, "r@x.com", "R", "pw");
        reviewer.admin_status = 1;
        state.admins.insert(&reviewer).await.unwrap();
        let created = create(&state, "1").await;

        // Act
        let app = router().with_state(state.clone());
        let (status, json) = send(
            app,
            "POST",
            "/publish",
            Some(json!({ "admin_id": "1", "chapter_id": created["chapter_id"] })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let request_id: i64 = json["request_id"].as_str().unwrap().parse().unwrap();
        let reviewer = state.admins.get_by_id(1).await.unwrap();
        assert_eq!(reviewer.requests_received, vec![request_id]);

        let chapter_id = created["chapter_id"].as_str().unwrap();
        let app = router().with_state(state);
        let (_, chapter) = send(app, "GET", &format!("/{chapter_id}"), None).await;
        assert_eq!(chapter["status"], 2);
    }

    #[tokio::test]
    async fn test_chapters_by_user_filters_for_players() {
        // Arrange
        let state = test_state();
        let created = create(&state, "1").await;
        let chapter_id: i64 = created["chapter_id"].as_str().unwrap().parse().unwrap();
        let mut published = state.chapters.get_by_id(chapter_id).await.unwrap();
        published.status = ChapterStatus::Published;
        state.chapters.update(&published).await.unwrap();
        create(&state, "1").await;

        state
            .admins
            .insert(&Admin::new(1, "a@x.com", "A", "pw"))
            .await
            .unwrap();
        state
            .players
            .insert(&Player {
                id: 2,
                version: 0,
                name: "Reader".into(),
                email: "p@x.com".into(),
                password: "pw".into(),
                admin: false,
            })
            .await
            .unwrap();

        // Act
        let app = router().with_state(state.clone());
        let (admin_status, admin_view) =
            send(app, "POST", "/by-user", Some(json!({ "user_id": "1" }))).await;
        let app = router().with_state(state.clone());
        let (player_status, player_view) =
            send(app, "POST", "/by-user", Some(json!({ "user_id": "2" }))).await;
        let app = router().with_state(state);
        let (unknown_status, _) =
            send(app, "POST", "/by-user", Some(json!({ "user_id": "3" }))).await;

        // Assert
        assert_eq!(admin_status, StatusCode::OK);
        assert_eq!(admin_view.as_array().unwrap().len(), 2);
        assert_eq!(player_status, StatusCode::OK);
        assert_eq!(player_view.as_array().unwrap().len(), 1);
        assert_eq!(player_view[0]["chapter_id"], chapter_id.to_string());
        assert_eq!(unknown_status, StatusCode::NOT_FOUND);
    }
}
