//! Query handlers for the Chapter Authoring context.
//!
//! This module contains query handlers that load entities and return
//! read-only view DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyloom_core::error::DomainError;
use storyloom_core::repository::Repository;
use storyloom_core::wire;

use crate::domain::aggregates::{Branching, Chapter, EndInfo, Node, NodeEvent};
use crate::domain::status::ChapterStatus;

/// Read-only view of a chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterView {
    /// The chapter identifier.
    #[serde(with = "wire::id")]
    pub chapter_id: i64,
    /// The authoring admin.
    #[serde(with = "wire::id")]
    pub author: i64,
    /// Display name.
    pub name: String,
    /// Publication state.
    pub status: ChapterStatus,
    /// Entry node, `0` if none.
    #[serde(with = "wire::id")]
    pub start_node: i64,
    /// Owned nodes in order.
    #[serde(with = "wire::ids")]
    pub nodes: Vec<i64>,
    /// Referenced characters.
    #[serde(with = "wire::ids")]
    pub characters: Vec<i64>,
    /// Edit history, actor ids by edit time.
    #[serde(with = "wire::id_values")]
    pub updated_at: BTreeMap<DateTime<Utc>, i64>,
    /// Current version.
    pub version: i64,
}

impl From<Chapter> for ChapterView {
    fn from(chapter: Chapter) -> Self {
        Self {
            chapter_id: chapter.id,
            author: chapter.author,
            name: chapter.name,
            status: chapter.status,
            start_node: chapter.start_node,
            nodes: chapter.nodes,
            characters: chapter.characters,
            updated_at: chapter.updated_at,
            version: chapter.version,
        }
    }
}

/// Read-only view of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    /// The node identifier.
    #[serde(with = "wire::id")]
    pub node_id: i64,
    /// Owning chapter.
    #[serde(with = "wire::id")]
    pub chapter_id: i64,
    /// Human label.
    pub slug: String,
    /// Events by position.
    pub events: BTreeMap<i32, NodeEvent>,
    /// Decision structure.
    pub branching: Branching,
    /// Ending marker.
    pub end: EndInfo,
    /// Author note.
    pub comment: String,
}

impl From<Node> for NodeView {
    fn from(node: Node) -> Self {
        Self {
            node_id: node.id,
            chapter_id: node.chapter_id,
            slug: node.slug,
            events: node.events,
            branching: node.branching,
            end: node.end,
            comment: node.comment,
        }
    }
}

/// Retrieves a chapter by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the chapter does not exist.
pub async fn get_chapter_by_id(
    chapter_id: i64,
    chapters: &dyn Repository<Chapter>,
) -> Result<ChapterView, DomainError> {
    Ok(chapters.get_by_id(chapter_id).await?.into())
}

/// Retrieves a node by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the node does not exist.
pub async fn get_node_by_id(
    node_id: i64,
    nodes: &dyn Repository<Node>,
) -> Result<NodeView, DomainError> {
    Ok(nodes.get_by_id(node_id).await?.into())
}

/// Retrieves every node of a chapter, in the chapter's list order.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the chapter or one of its listed nodes
/// does not exist.
pub async fn get_chapter_nodes(
    chapter_id: i64,
    chapters: &dyn Repository<Chapter>,
    nodes: &dyn Repository<Node>,
) -> Result<Vec<NodeView>, DomainError> {
    let chapter = chapters.get_by_id(chapter_id).await?;
    let mut views = Vec::with_capacity(chapter.nodes.len());
    for node_id in chapter.nodes {
        views.push(nodes.get_by_id(node_id).await?.into());
    }
    Ok(views)
}

/// Retrieves all chapters, or only published ones.
///
/// # Errors
///
/// Returns the store error if the query fails.
pub async fn list_chapters(
    chapters: &dyn Repository<Chapter>,
    published_only: bool,
) -> Result<Vec<ChapterView>, DomainError> {
    let found = chapters
        .query_all(&|chapter: &Chapter| !published_only || chapter.is_published())
        .await?;
    Ok(found.into_iter().map(ChapterView::from).collect())
}
