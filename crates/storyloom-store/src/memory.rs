//! In-memory implementation of the `Repository` trait.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use storyloom_core::entity::Entity;
use storyloom_core::error::DomainError;
use storyloom_core::repository::{Predicate, Repository};

/// A mutex-guarded ordered map of entities keyed by id.
#[derive(Debug)]
pub struct InMemoryRepository<E> {
    rows: Mutex<BTreeMap<i64, E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a repository pre-populated with `entities`, stored as given.
    #[must_use]
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let rows = entities.into_iter().map(|e| (e.id(), e)).collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, BTreeMap<i64, E>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn insert(&self, entity: &E) -> Result<(), DomainError> {
        let mut rows = self.rows();
        if rows.contains_key(&entity.id()) {
            return Err(DomainError::Duplicate(format!(
                "{} {} already exists",
                E::KIND,
                entity.id()
            )));
        }
        rows.insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<E, DomainError> {
        self.rows()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(E::KIND, id))
    }

    async fn update(&self, entity: &E) -> Result<E, DomainError> {
        let mut rows = self.rows();
        let stored = rows
            .get_mut(&entity.id())
            .ok_or_else(|| DomainError::not_found(E::KIND, entity.id()))?;
        if stored.version() != entity.version() {
            return Err(DomainError::ConcurrencyConflict {
                kind: E::KIND,
                id: entity.id(),
                expected: entity.version(),
                actual: stored.version(),
            });
        }
        let mut next = entity.clone();
        next.set_version(entity.version() + 1);
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.rows().remove(&id);
        Ok(())
    }

    async fn query_all(&self, predicate: Predicate<'_, E>) -> Result<Vec<E>, DomainError> {
        Ok(self
            .rows()
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde::{Deserialize, Serialize};
    use storyloom_core::repository::{MAX_UPDATE_ATTEMPTS, modify_entity};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: i64,
        version: i64,
        text: String,
    }

    impl Entity for Note {
        const KIND: &'static str = "note";

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

    fn note(id: i64, text: &str) -> Note {
        Note {
            id,
            version: 0,
            text: text.to_owned(),
        }
    }

    /// Bumps the stored version behind the caller's back on the first
    /// `conflicts` updates.
    struct ContendedRepository {
        inner: InMemoryRepository<Note>,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl Repository<Note> for ContendedRepository {
        async fn insert(&self, entity: &Note) -> Result<(), DomainError> {
            self.inner.insert(entity).await
        }

        async fn get_by_id(&self, id: i64) -> Result<Note, DomainError> {
            self.inner.get_by_id(id).await
        }

        async fn update(&self, entity: &Note) -> Result<Note, DomainError> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                let current = self.inner.get_by_id(entity.id).await?;
                self.inner.update(&current).await?;
            }
            self.inner.update(entity).await
        }

        async fn delete(&self, id: i64) -> Result<(), DomainError> {
            self.inner.delete(id).await
        }

        async fn query_all(&self, predicate: Predicate<'_, Note>) -> Result<Vec<Note>, DomainError> {
            self.inner.query_all(predicate).await
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_existing_id() {
        // Arrange
        let repo = InMemoryRepository::new();
        repo.insert(&note(1, "a")).await.unwrap();

        // Act
        let result = repo.insert(&note(1, "b")).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Duplicate(msg) => assert_eq!(msg, "note 1 already exists"),
            other => panic!("expected Duplicate, got {other:?}"),
        }
        assert_eq!(repo.get_by_id(1).await.unwrap().text, "a");
    }

    #[tokio::test]
    async fn test_get_by_id_returns_not_found_for_missing_id() {
        let repo: InMemoryRepository<Note> = InMemoryRepository::new();

        match repo.get_by_id(9).await.unwrap_err() {
            DomainError::NotFound { kind, id } => {
                assert_eq!(kind, "note");
                assert_eq!(id, 9);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_rejects_stale_copy() {
        // Arrange
        let repo = InMemoryRepository::with_entities([note(1, "a")]);
        let stale = repo.get_by_id(1).await.unwrap();
        let mut fresh = stale.clone();
        fresh.text = "b".to_owned();

        // Act
        let stored = repo.update(&fresh).await.unwrap();
        let result = repo.update(&stale).await;

        // Assert
        assert_eq!(stored.version, 1);
        match result.unwrap_err() {
            DomainError::ConcurrencyConflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
        assert_eq!(repo.get_by_id(1).await.unwrap().text, "b");
    }

    #[tokio::test]
    async fn test_query_all_filters_in_id_order() {
        let repo = InMemoryRepository::with_entities([note(3, "x"), note(1, "x"), note(2, "y")]);

        let found = repo.query_all(&|n: &Note| n.text == "x").await.unwrap();

        let ids: Vec<i64> = found.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryRepository::with_entities([note(1, "a")]);

        repo.delete(1).await.unwrap();
        repo.delete(1).await.unwrap();

        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_modify_entity_retries_after_conflict() {
        // Arrange
        let repo = ContendedRepository {
            inner: InMemoryRepository::with_entities([note(1, "a")]),
            conflicts: AtomicU32::new(2),
        };
        let mut calls = 0;

        // Act
        let stored = modify_entity(&repo, 1, |n| {
            calls += 1;
            n.text.push('!');
            Ok(())
        })
        .await
        .unwrap();

        // Assert
        assert_eq!(calls, 3);
        assert_eq!(stored.text, "a!");
        assert_eq!(stored.version, 3);
    }

    #[tokio::test]
    async fn test_modify_entity_gives_up_after_max_attempts() {
        // Arrange
        let repo = ContendedRepository {
            inner: InMemoryRepository::with_entities([note(1, "a")]),
            conflicts: AtomicU32::new(MAX_UPDATE_ATTEMPTS),
        };

        // Act
        let result = modify_entity(&repo, 1, |_| Ok(())).await;

        // Assert
        assert!(matches!(
            result.unwrap_err(),
            DomainError::ConcurrencyConflict { .. }
        ));
    }
}
