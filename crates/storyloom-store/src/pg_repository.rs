//! `PostgreSQL` implementation of the `Repository` trait.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use storyloom_core::entity::Entity;
use storyloom_core::error::DomainError;
use storyloom_core::repository::{Predicate, Repository};
use tracing::debug;

use crate::schema::CREATE_ENTITIES_TABLE;

/// PostgreSQL-backed repository storing one entity type as JSONB rows.
#[derive(Debug)]
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PgRepository<E> {
    /// Creates a new `PgRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

/// Creates the `entities` table and its indexes if they do not exist.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` if the DDL fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(CREATE_ENTITIES_TABLE).execute(pool).await?;
    Ok(())
}

fn infrastructure(err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn decode<E: Entity>(body: serde_json::Value, version: i64) -> Result<E, DomainError> {
    let mut entity: E = serde_json::from_value(body).map_err(|e| {
        DomainError::Infrastructure(format!("{} deserialization failed: {e}", E::KIND))
    })?;
    entity.set_version(version);
    Ok(entity)
}

fn encode<E: Entity>(entity: &E) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(entity).map_err(|e| {
        DomainError::Infrastructure(format!("{} serialization failed: {e}", E::KIND))
    })
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn insert(&self, entity: &E) -> Result<(), DomainError> {
        let body = encode(entity)?;
        let result = sqlx::query("INSERT INTO entities (kind, id, version, body) VALUES ($1, $2, $3, $4)")
            .bind(E::KIND)
            .bind(entity.id())
            .bind(entity.version())
            .bind(body)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                DomainError::Duplicate(format!("{} {} already exists", E::KIND, entity.id())),
            ),
            Err(err) => Err(infrastructure(&err)),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<E, DomainError> {
        let row: Option<(serde_json::Value, i64)> =
            sqlx::query_as("SELECT body, version FROM entities WHERE kind = $1 AND id = $2")
                .bind(E::KIND)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;

        let (body, version) = row.ok_or_else(|| DomainError::not_found(E::KIND, id))?;
        decode(body, version)
    }

    async fn update(&self, entity: &E) -> Result<E, DomainError> {
        let next_version = entity.version() + 1;
        let mut next = entity.clone();
        next.set_version(next_version);
        let body = encode(&next)?;

        let result = sqlx::query(
            "UPDATE entities SET body = $3, version = $4, updated_at = NOW() \
             WHERE kind = $1 AND id = $2 AND version = $5",
        )
        .bind(E::KIND)
        .bind(entity.id())
        .bind(body)
        .bind(next_version)
        .bind(entity.version())
        .execute(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        if result.rows_affected() == 1 {
            return Ok(next);
        }

        let actual: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM entities WHERE kind = $1 AND id = $2")
                .bind(E::KIND)
                .bind(entity.id())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;

        match actual {
            None => Err(DomainError::not_found(E::KIND, entity.id())),
            Some((actual,)) => {
                debug!(kind = E::KIND, id = entity.id(), actual, "stale update rejected");
                Err(DomainError::ConcurrencyConflict {
                    kind: E::KIND,
                    id: entity.id(),
                    expected: entity.version(),
                    actual,
                })
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM entities WHERE kind = $1 AND id = $2")
            .bind(E::KIND)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| infrastructure(&e))?;
        Ok(())
    }

    async fn query_all(&self, predicate: Predicate<'_, E>) -> Result<Vec<E>, DomainError> {
        let rows: Vec<(serde_json::Value, i64)> =
            sqlx::query_as("SELECT body, version FROM entities WHERE kind = $1 ORDER BY id")
                .bind(E::KIND)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;

        let mut matching = Vec::new();
        for (body, version) in rows {
            let entity: E = decode(body, version)?;
            if predicate(&entity) {
                matching.push(entity);
            }
        }
        Ok(matching)
    }
}
