//! Entities of the Chapter Authoring context.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyloom_core::entity::Entity;
use storyloom_core::error::DomainError;

use super::status::ChapterStatus;

/// Sentinel for "no start node assigned".
pub const NO_START_NODE: i64 = 0;

/// An authored chapter: the root of a node graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Entity identifier.
    pub id: i64,
    /// Optimistic-concurrency stamp.
    #[serde(default)]
    pub version: i64,
    /// The admin who created the chapter.
    pub author: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Publication state.
    pub status: ChapterStatus,
    /// Entry node, or [`NO_START_NODE`].
    #[serde(default)]
    pub start_node: i64,
    /// Nodes owned by this chapter, in creation/edit order.
    #[serde(default)]
    pub nodes: Vec<i64>,
    /// Characters appearing in this chapter.
    #[serde(default)]
    pub characters: Vec<i64>,
    /// Edit history: when, and by whom.
    #[serde(default)]
    pub updated_at: BTreeMap<DateTime<Utc>, i64>,
}

impl Chapter {
    /// Creates a draft chapter with no nodes. The creation itself is the
    /// first history entry, attributed to the chapter id.
    #[must_use]
    pub fn new(id: i64, author: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            version: 0,
            author,
            name: String::new(),
            status: ChapterStatus::Draft,
            start_node: NO_START_NODE,
            nodes: Vec::new(),
            characters: Vec::new(),
            updated_at: BTreeMap::from([(created_at, id)]),
        }
    }

    /// Appends `node_id` unless it is already listed. Returns whether the
    /// list changed.
    pub fn add_node(&mut self, node_id: i64) -> bool {
        if self.nodes.contains(&node_id) {
            return false;
        }
        self.nodes.push(node_id);
        true
    }

    /// Returns `true` if `node_id` belongs to this chapter.
    #[must_use]
    pub fn owns_node(&self, node_id: i64) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Points the chapter at its entry node.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the node is not listed.
    pub fn set_start_node(&mut self, node_id: i64) -> Result<(), DomainError> {
        if !self.owns_node(node_id) {
            return Err(DomainError::Validation(format!(
                "start node {node_id} is not part of chapter {}",
                self.id
            )));
        }
        self.start_node = node_id;
        Ok(())
    }

    /// Records an edit by `actor` at `at`.
    pub fn record_edit(&mut self, at: DateTime<Utc>, actor: i64) {
        self.updated_at.insert(at, actor);
    }

    /// Moves the chapter into review.
    ///
    /// # Errors
    ///
    /// Propagates the rejection of [`ChapterStatus::submit_for_review`].
    pub fn submit_for_review(&mut self) -> Result<(), DomainError> {
        self.status = self.status.submit_for_review()?;
        Ok(())
    }

    /// Returns `true` once players may read the chapter.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ChapterStatus::Published
    }
}

impl Entity for Chapter {
    const KIND: &'static str = "chapter";

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

/// A scripted event at a position inside a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeEvent {
    /// Event discriminator understood by the reader runtime.
    pub kind: String,
    /// Event-specific data.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// What follows a node. Opaque to authoring beyond the target list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Branching {
    /// Candidate next nodes.
    #[serde(default)]
    pub targets: Vec<i64>,
    /// Condition selecting among the targets.
    #[serde(default)]
    pub condition: serde_json::Value,
}

/// Terminal marker. Empty `kind` means the node is not an ending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EndInfo {
    /// Ending discriminator.
    #[serde(default)]
    pub kind: String,
    /// Ending-specific data.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EndInfo {
    /// Returns `true` when this marks an ending.
    #[must_use]
    pub fn is_ending(&self) -> bool {
        !self.kind.is_empty()
    }
}

/// A narrative beat inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Entity identifier.
    pub id: i64,
    /// Optimistic-concurrency stamp.
    #[serde(default)]
    pub version: i64,
    /// Owning chapter. Fixed at creation.
    pub chapter_id: i64,
    /// Human label; may be empty.
    #[serde(default)]
    pub slug: String,
    /// Events keyed by sequence position; gaps are allowed.
    #[serde(default)]
    pub events: BTreeMap<i32, NodeEvent>,
    /// Decision structure.
    #[serde(default)]
    pub branching: Branching,
    /// Ending marker.
    #[serde(default)]
    pub end: EndInfo,
    /// Free-form author note.
    #[serde(default)]
    pub comment: String,
}

impl Node {
    /// Creates an empty node in `chapter_id`.
    #[must_use]
    pub fn new(id: i64, chapter_id: i64, slug: impl Into<String>) -> Self {
        Self {
            id,
            version: 0,
            chapter_id,
            slug: slug.into(),
            events: BTreeMap::new(),
            branching: Branching::default(),
            end: EndInfo::default(),
            comment: " ".to_owned(),
        }
    }
}

impl Entity for Node {
    const KIND: &'static str = "node";

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
