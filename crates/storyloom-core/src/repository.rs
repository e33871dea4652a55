//! Entity store abstraction.
//!
//! The store is a generic key-by-id contract. Implementations live in
//! `storyloom-store`; domain crates only see this trait.

use async_trait::async_trait;
use tracing::debug;

use crate::entity::Entity;
use crate::error::DomainError;

/// Number of read-modify-write attempts before a conflict is surfaced.
pub const MAX_UPDATE_ATTEMPTS: u32 = 5;

/// Predicate used by [`Repository::query_all`].
pub type Predicate<'a, E> = &'a (dyn Fn(&E) -> bool + Send + Sync);

/// Repository trait for reading and writing one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Inserts a new entity.
    ///
    /// Returns [`DomainError::Duplicate`] if an entity with the same id exists.
    async fn insert(&self, entity: &E) -> Result<(), DomainError>;

    /// Loads an entity by id.
    ///
    /// Returns [`DomainError::NotFound`] when absent.
    async fn get_by_id(&self, id: i64) -> Result<E, DomainError>;

    /// Replaces a stored entity, provided its version still matches, and
    /// returns the entity as stored (with the bumped version).
    async fn update(&self, entity: &E) -> Result<E, DomainError>;

    /// Removes an entity. Removing an absent id is not an error.
    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    /// Returns every entity matching `predicate`, ordered by id.
    async fn query_all(&self, predicate: Predicate<'_, E>) -> Result<Vec<E>, DomainError>;
}

/// Loads the entity `id`, applies `mutate`, and writes it back.
///
/// A [`DomainError::ConcurrencyConflict`] from the write restarts the cycle
/// from a fresh read, up to [`MAX_UPDATE_ATTEMPTS`] times. `mutate` may run
/// more than once and must tolerate that.
///
/// # Errors
///
/// Returns whatever `get_by_id` or `mutate` fail with, or the last conflict
/// once the attempts are exhausted.
pub async fn modify_entity<E, F>(
    repo: &dyn Repository<E>,
    id: i64,
    mut mutate: F,
) -> Result<E, DomainError>
where
    E: Entity,
    F: FnMut(&mut E) -> Result<(), DomainError> + Send,
{
    let mut attempt = 1;
    loop {
        let mut entity = repo.get_by_id(id).await?;
        mutate(&mut entity)?;
        match repo.update(&entity).await {
            Ok(stored) => return Ok(stored),
            Err(DomainError::ConcurrencyConflict { .. }) if attempt < MAX_UPDATE_ATTEMPTS => {
                debug!(kind = E::KIND, id, attempt, "version conflict, retrying update");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
