//! Command handlers for the Chapter Authoring context.
//!
//! Each handler is a sequence of independent store round trips; there is no
//! transaction spanning the chapter and its nodes. Chapter list edits go
//! through `modify_entity` so concurrent editors retry instead of
//! overwriting each other.

use std::collections::HashSet;

use serde::Serialize;
use storyloom_core::clock::Clock;
use storyloom_core::command::Command;
use storyloom_core::error::DomainError;
use storyloom_core::id::IdGenerator;
use storyloom_core::repository::{Repository, modify_entity};
use tracing::{info, warn};

use crate::domain::aggregates::{Chapter, NO_START_NODE, Node};
use crate::domain::commands::{CreateDefaultChapter, CreateNode, UpdateChapter, UpdateNode};

/// Identifiers produced by [`handle_create_default_chapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedChapter {
    /// The new chapter.
    pub chapter_id: i64,
    /// Its root node, already set as the start node.
    pub start_node_id: i64,
}

/// Handles the `CreateDefaultChapter` command: persists a draft chapter,
/// creates its root node, and records that node as the start node.
///
/// # Errors
///
/// Returns `DomainError` if any of the three writes fails.
pub async fn handle_create_default_chapter(
    command: &CreateDefaultChapter,
    clock: &dyn Clock,
    ids: &IdGenerator,
    chapters: &dyn Repository<Chapter>,
    nodes: &dyn Repository<Node>,
) -> Result<CreatedChapter, DomainError> {
    let chapter_id = ids.next_id();
    chapters
        .insert(&Chapter::new(chapter_id, command.author_id, clock.now()))
        .await?;

    let create_node = CreateNode {
        correlation_id: command.correlation_id,
        chapter_id,
        slug: String::new(),
    };
    let start_node_id = handle_create_node(&create_node, ids, chapters, nodes).await?;

    modify_entity(chapters, chapter_id, |chapter| {
        chapter.set_start_node(start_node_id)
    })
    .await?;

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        chapter_id,
        start_node_id,
        "chapter created"
    );

    Ok(CreatedChapter {
        chapter_id,
        start_node_id,
    })
}

/// Handles the `CreateNode` command: persists an empty node and appends it
/// to the owning chapter's node list.
///
/// If the chapter update fails after the node was stored, the node is
/// deleted again before the error is returned.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the chapter does not exist, or the
/// store error of the node insert or chapter update.
pub async fn handle_create_node(
    command: &CreateNode,
    ids: &IdGenerator,
    chapters: &dyn Repository<Chapter>,
    nodes: &dyn Repository<Node>,
) -> Result<i64, DomainError> {
    chapters.get_by_id(command.chapter_id).await?;

    let node_id = ids.next_id();
    nodes
        .insert(&Node::new(node_id, command.chapter_id, command.slug.clone()))
        .await?;

    let linked = modify_entity(chapters, command.chapter_id, |chapter| {
        chapter.add_node(node_id);
        Ok(())
    })
    .await;

    if let Err(err) = linked {
        warn!(
            correlation_id = %command.correlation_id,
            chapter_id = command.chapter_id,
            node_id,
            error = %err,
            "linking node to chapter failed, removing node"
        );
        if let Err(cleanup) = nodes.delete(node_id).await {
            warn!(node_id, error = %cleanup, "orphaned node could not be removed");
        }
        return Err(err);
    }

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        chapter_id = command.chapter_id,
        node_id,
        "node created"
    );

    Ok(node_id)
}

/// Handles the `UpdateChapter` command: replaces name, node and character
/// lists, and optionally the start node and status, in one update.
///
/// # Errors
///
/// Returns `DomainError::Validation` if a node is listed twice, belongs to
/// another chapter, or the start node would not be among the listed nodes.
/// Returns `DomainError::NotFound` for a missing chapter or node.
pub async fn handle_update_chapter(
    command: &UpdateChapter,
    clock: &dyn Clock,
    chapters: &dyn Repository<Chapter>,
    nodes: &dyn Repository<Node>,
) -> Result<Chapter, DomainError> {
    let mut seen = HashSet::new();
    for node_id in &command.node_ids {
        if !seen.insert(*node_id) {
            return Err(DomainError::Validation(format!(
                "node {node_id} is listed more than once"
            )));
        }
        let node = nodes.get_by_id(*node_id).await?;
        if node.chapter_id != command.chapter_id {
            return Err(DomainError::Validation(format!(
                "node {node_id} belongs to chapter {}",
                node.chapter_id
            )));
        }
    }

    let now = clock.now();
    let chapter = modify_entity(chapters, command.chapter_id, |chapter| {
        chapter.name.clone_from(&command.name);
        chapter.nodes.clone_from(&command.node_ids);
        chapter.characters.clone_from(&command.character_ids);
        if command.start_node != NO_START_NODE {
            chapter.set_start_node(command.start_node)?;
        } else if chapter.start_node != NO_START_NODE && !chapter.owns_node(chapter.start_node) {
            return Err(DomainError::Validation(format!(
                "start node {} would be removed from chapter {}",
                chapter.start_node, chapter.id
            )));
        }
        if let Some(status) = command.status {
            chapter.status = status;
        }
        chapter.record_edit(now, command.author_id);
        Ok(())
    })
    .await?;

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        chapter_id = chapter.id,
        nodes = chapter.nodes.len(),
        status = %chapter.status,
        "chapter updated"
    );

    Ok(chapter)
}

/// Handles the `UpdateNode` command: replaces the node's content. The
/// owning chapter never changes.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the node does not exist, or the store
/// error of the update.
pub async fn handle_update_node(
    command: &UpdateNode,
    nodes: &dyn Repository<Node>,
) -> Result<Node, DomainError> {
    let node = modify_entity(nodes, command.node_id, |node| {
        node.slug.clone_from(&command.slug);
        node.events.clone_from(&command.events);
        node.branching.clone_from(&command.branching);
        node.end.clone_from(&command.end);
        node.comment.clone_from(&command.comment);
        Ok(())
    })
    .await?;

    info!(
        correlation_id = %command.correlation_id,
        command = command.command_type(),
        node_id = node.id,
        chapter_id = node.chapter_id,
        "node updated"
    );

    Ok(node)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use storyloom_core::error::DomainError;
    use storyloom_core::repository::Repository;
    use storyloom_store::InMemoryRepository;
    use storyloom_test_support::{
        FailingRepository, FaultyRepository, FixedClock, fixed_id_generator, fixed_now,
    };
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::{Branching, EndInfo, NodeEvent};
    use crate::domain::status::ChapterStatus;

    const AUTHOR: i64 = 42;

    fn create_chapter_command() -> CreateDefaultChapter {
        CreateDefaultChapter {
            correlation_id: Uuid::new_v4(),
            author_id: AUTHOR,
        }
    }

    fn create_node_command(chapter_id: i64, slug: &str) -> CreateNode {
        CreateNode {
            correlation_id: Uuid::new_v4(),
            chapter_id,
            slug: slug.to_owned(),
        }
    }

    fn update_command(chapter: &Chapter) -> UpdateChapter {
        UpdateChapter {
            correlation_id: Uuid::new_v4(),
            chapter_id: chapter.id,
            name: chapter.name.clone(),
            node_ids: chapter.nodes.clone(),
            character_ids: chapter.characters.clone(),
            author_id: AUTHOR,
            start_node: 0,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_default_chapter_links_start_node_both_ways() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();

        // Act
        let created =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();

        // Assert
        let chapter = chapters.get_by_id(created.chapter_id).await.unwrap();
        assert_eq!(chapter.start_node, created.start_node_id);
        assert_eq!(chapter.nodes, vec![created.start_node_id]);
        assert_eq!(chapter.author, AUTHOR);
        assert_eq!(chapter.status, ChapterStatus::Draft);
        assert!(chapter.characters.is_empty());

        let node = nodes.get_by_id(created.start_node_id).await.unwrap();
        assert_eq!(node.chapter_id, created.chapter_id);
        assert_eq!(node.slug, "");
    }

    #[tokio::test]
    async fn test_create_default_chapter_fails_when_store_is_down() {
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = FailingRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();

        let result =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_create_node_appends_node_exactly_once() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();
        let created =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();

        // Act
        let node_id = handle_create_node(
            &create_node_command(created.chapter_id, "crossroads"),
            &ids,
            &chapters,
            &nodes,
        )
        .await
        .unwrap();

        // Assert
        let chapter = chapters.get_by_id(created.chapter_id).await.unwrap();
        assert_eq!(chapter.nodes.iter().filter(|id| **id == node_id).count(), 1);
        assert_eq!(chapter.nodes, vec![created.start_node_id, node_id]);
        assert_eq!(nodes.get_by_id(node_id).await.unwrap().slug, "crossroads");
    }

    #[tokio::test]
    async fn test_create_node_returns_not_found_for_missing_chapter() {
        // Arrange
        let ids = fixed_id_generator();
        let chapters: InMemoryRepository<Chapter> = InMemoryRepository::new();
        let nodes: InMemoryRepository<Node> = InMemoryRepository::new();

        // Act
        let result = handle_create_node(&create_node_command(404, "x"), &ids, &chapters, &nodes).await;

        // Assert
        match result.unwrap_err() {
            DomainError::NotFound { kind, id } => {
                assert_eq!(kind, "chapter");
                assert_eq!(id, 404);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_create_node_removes_node_when_chapter_update_fails() {
        // Arrange
        let ids = fixed_id_generator();
        let chapter = Chapter::new(1, AUTHOR, fixed_now());
        let chapters =
            FaultyRepository::new(InMemoryRepository::with_entities([chapter])).fail_updates_of([1]);
        let nodes = FaultyRepository::new(InMemoryRepository::<Node>::new());

        // Act
        let result = handle_create_node(&create_node_command(1, "x"), &ids, &chapters, &nodes).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(nodes.deleted_ids().len(), 1);
        assert!(nodes.inner().is_empty());
    }

    #[tokio::test]
    async fn test_create_node_propagates_node_insert_failure() {
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::with_entities([Chapter::new(1, AUTHOR, fixed_now())]);
        let nodes = FaultyRepository::new(InMemoryRepository::<Node>::new()).failing_inserts();

        let result = handle_create_node(&create_node_command(1, "x"), &ids, &chapters, &nodes).await;

        assert!(result.is_err());
        assert!(chapters.get_by_id(1).await.unwrap().nodes.is_empty());
    }

    #[tokio::test]
    async fn test_update_chapter_replaces_fields_and_records_edit() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();
        let created =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();
        let second = handle_create_node(
            &create_node_command(created.chapter_id, "second"),
            &ids,
            &chapters,
            &nodes,
        )
        .await
        .unwrap();
        let chapter = chapters.get_by_id(created.chapter_id).await.unwrap();

        let later = FixedClock(fixed_now() + chrono::Duration::minutes(5));
        let mut command = update_command(&chapter);
        command.name = "The Lighthouse".to_owned();
        command.node_ids = vec![second, created.start_node_id];
        command.character_ids = vec![900, 901];
        command.start_node = second;
        command.author_id = 77;
        command.status = Some(ChapterStatus::Published);

        // Act
        let updated = handle_update_chapter(&command, &later, &chapters, &nodes)
            .await
            .unwrap();

        // Assert
        assert_eq!(updated.name, "The Lighthouse");
        assert_eq!(updated.nodes, vec![second, created.start_node_id]);
        assert_eq!(updated.characters, vec![900, 901]);
        assert_eq!(updated.start_node, second);
        assert_eq!(updated.status, ChapterStatus::Published);
        assert_eq!(updated.updated_at.get(&later.0), Some(&77));
        assert_eq!(updated.updated_at.len(), 2);
        assert_eq!(chapters.get_by_id(created.chapter_id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_chapter_zero_start_node_keeps_current() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();
        let created =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();
        let chapter = chapters.get_by_id(created.chapter_id).await.unwrap();

        // Act
        let updated = handle_update_chapter(&update_command(&chapter), &clock, &chapters, &nodes)
            .await
            .unwrap();

        // Assert
        assert_eq!(updated.start_node, created.start_node_id);
        assert_eq!(updated.status, ChapterStatus::Draft);
    }

    #[tokio::test]
    async fn test_update_chapter_rejects_node_of_other_chapter() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();
        let first =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();
        let other =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();
        let chapter = chapters.get_by_id(first.chapter_id).await.unwrap();
        let mut command = update_command(&chapter);
        command.node_ids.push(other.start_node_id);

        // Act
        let result = handle_update_chapter(&command, &clock, &chapters, &nodes).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(
                msg,
                format!(
                    "node {} belongs to chapter {}",
                    other.start_node_id, other.chapter_id
                )
            ),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(chapters.get_by_id(first.chapter_id).await.unwrap(), chapter);
    }

    #[tokio::test]
    async fn test_update_chapter_rejects_duplicate_node_ids() {
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();
        let created =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();
        let chapter = chapters.get_by_id(created.chapter_id).await.unwrap();
        let mut command = update_command(&chapter);
        command.node_ids.push(created.start_node_id);

        let result = handle_update_chapter(&command, &clock, &chapters, &nodes).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_chapter_rejects_dropping_start_node() {
        let clock = FixedClock(fixed_now());
        let ids = fixed_id_generator();
        let chapters = InMemoryRepository::<Chapter>::new();
        let nodes = InMemoryRepository::<Node>::new();
        let created =
            handle_create_default_chapter(&create_chapter_command(), &clock, &ids, &chapters, &nodes)
                .await
                .unwrap();
        let chapter = chapters.get_by_id(created.chapter_id).await.unwrap();
        let mut command = update_command(&chapter);
        command.node_ids.clear();

        let result = handle_update_chapter(&command, &clock, &chapters, &nodes).await;

        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(
                msg,
                format!(
                    "start node {} would be removed from chapter {}",
                    created.start_node_id, created.chapter_id
                )
            ),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_chapter_returns_not_found_for_missing_chapter() {
        let clock = FixedClock(fixed_now());
        let chapters: InMemoryRepository<Chapter> = InMemoryRepository::new();
        let nodes: InMemoryRepository<Node> = InMemoryRepository::new();
        let command = update_command(&Chapter::new(5, AUTHOR, fixed_now()));

        let result = handle_update_chapter(&command, &clock, &chapters, &nodes).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_node_replaces_content_but_not_owner() {
        // Arrange
        let nodes = InMemoryRepository::with_entities([Node::new(3, 1, "old")]);
        let command = UpdateNode {
            correlation_id: Uuid::new_v4(),
            node_id: 3,
            slug: "new".to_owned(),
            events: BTreeMap::from([(
                4,
                NodeEvent {
                    kind: "dialogue".to_owned(),
                    data: serde_json::json!({ "line": "Hello" }),
                },
            )]),
            branching: Branching {
                targets: vec![5, 6],
                condition: serde_json::json!({ "choice": true }),
            },
            end: EndInfo::default(),
            comment: "draft".to_owned(),
        };

        // Act
        let node = handle_update_node(&command, &nodes).await.unwrap();

        // Assert
        assert_eq!(node.chapter_id, 1);
        assert_eq!(node.slug, "new");
        assert_eq!(node.events[&4].kind, "dialogue");
        assert_eq!(node.branching.targets, vec![5, 6]);
        assert_eq!(node.comment, "draft");
        assert_eq!(node.version, 1);
    }
}
