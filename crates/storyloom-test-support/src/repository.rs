//! Test repositories: `Repository` implementations that fail on purpose.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Mutex;

use async_trait::async_trait;
use storyloom_core::entity::Entity;
use storyloom_core::error::DomainError;
use storyloom_core::repository::{Predicate, Repository};

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

/// A repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingRepository<E>(PhantomData<fn() -> E>);

impl<E> FailingRepository<E> {
    /// Creates a repository whose every call fails.
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for FailingRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for FailingRepository<E> {
    async fn insert(&self, _entity: &E) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn get_by_id(&self, _id: i64) -> Result<E, DomainError> {
        Err(connection_refused())
    }

    async fn update(&self, _entity: &E) -> Result<E, DomainError> {
        Err(connection_refused())
    }

    async fn delete(&self, _id: i64) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn query_all(&self, _predicate: Predicate<'_, E>) -> Result<Vec<E>, DomainError> {
        Err(connection_refused())
    }
}

/// Wraps a working repository and fails selected operations.
///
/// Updates of the ids passed to [`FaultyRepository::fail_updates_of`] and,
/// when enabled, every insert fail with an infrastructure error. Deleted ids
/// are recorded so compensation steps can be asserted.
#[derive(Debug)]
pub struct FaultyRepository<R> {
    inner: R,
    failing_updates: Mutex<HashSet<i64>>,
    fail_inserts: bool,
    deleted: Mutex<Vec<i64>>,
}

impl<R> FaultyRepository<R> {
    /// Wraps `inner` without any faults configured.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failing_updates: Mutex::new(HashSet::new()),
            fail_inserts: false,
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Makes every insert fail.
    #[must_use]
    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Makes updates of `ids` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn fail_updates_of(self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.failing_updates.lock().unwrap().extend(ids);
        self
    }

    /// Returns the wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns the ids passed to `delete`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted_ids(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl<E, R> Repository<E> for FaultyRepository<R>
where
    E: Entity,
    R: Repository<E>,
{
    async fn insert(&self, entity: &E) -> Result<(), DomainError> {
        if self.fail_inserts {
            return Err(connection_refused());
        }
        self.inner.insert(entity).await
    }

    async fn get_by_id(&self, id: i64) -> Result<E, DomainError> {
        self.inner.get_by_id(id).await
    }

    async fn update(&self, entity: &E) -> Result<E, DomainError> {
        let failing = self.failing_updates.lock().unwrap().contains(&entity.id());
        if failing {
            return Err(connection_refused());
        }
        self.inner.update(entity).await
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(id);
        self.inner.delete(id).await
    }

    async fn query_all(&self, predicate: Predicate<'_, E>) -> Result<Vec<E>, DomainError> {
        self.inner.query_all(predicate).await
    }
}
