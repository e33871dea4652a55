//! Storyloom entity stores.
//!
//! Two implementations of [`storyloom_core::repository::Repository`]: an
//! in-memory map used by tests and single-node deployments, and a
//! PostgreSQL store that keeps every entity as a JSONB row.

pub mod memory;
pub mod pg_repository;
pub mod schema;

pub use memory::InMemoryRepository;
pub use pg_repository::PgRepository;
