//! Commands for the Chapter Authoring context.

use std::collections::BTreeMap;

use storyloom_core::command::Command;
use uuid::Uuid;

use super::aggregates::{Branching, EndInfo, NodeEvent};
use super::status::ChapterStatus;

/// Command to create a chapter together with its root node.
#[derive(Debug, Clone)]
pub struct CreateDefaultChapter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The admin authoring the chapter.
    pub author_id: i64,
}

/// Command to add a node to an existing chapter.
#[derive(Debug, Clone)]
pub struct CreateNode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The chapter receiving the node.
    pub chapter_id: i64,
    /// Human label for the node.
    pub slug: String,
}

/// Command to replace a chapter's editable fields.
#[derive(Debug, Clone)]
pub struct UpdateChapter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The chapter to update.
    pub chapter_id: i64,
    /// New display name.
    pub name: String,
    /// New node list; every id must already belong to the chapter.
    pub node_ids: Vec<i64>,
    /// New character list.
    pub character_ids: Vec<i64>,
    /// The admin making the edit.
    pub author_id: i64,
    /// New entry node; `0` keeps the current one.
    pub start_node: i64,
    /// New status; `None` keeps the current one.
    pub status: Option<ChapterStatus>,
}

/// Command to replace a node's content.
#[derive(Debug, Clone)]
pub struct UpdateNode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node to update.
    pub node_id: i64,
    /// New label.
    pub slug: String,
    /// New event map.
    pub events: BTreeMap<i32, NodeEvent>,
    /// New decision structure.
    pub branching: Branching,
    /// New ending marker.
    pub end: EndInfo,
    /// New author note.
    pub comment: String,
}

impl Command for CreateDefaultChapter {
    fn command_type(&self) -> &'static str {
        "authoring.create_default_chapter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for CreateNode {
    fn command_type(&self) -> &'static str {
        "authoring.create_node"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for UpdateChapter {
    fn command_type(&self) -> &'static str {
        "authoring.update_chapter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for UpdateNode {
    fn command_type(&self) -> &'static str {
        "authoring.update_node"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
