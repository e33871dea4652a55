//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;
use storyloom_authoring::domain::aggregates::{Chapter, Node};
use storyloom_character::domain::aggregates::Character;
use storyloom_core::clock::Clock;
use storyloom_core::id::IdGenerator;
use storyloom_core::repository::Repository;
use storyloom_core::rng::DeterministicRng;
use storyloom_moderation::application::ModerationRepositories;
use storyloom_moderation::domain::aggregates::{Admin, Player};
use storyloom_moderation::domain::request::Request;
use storyloom_store::{InMemoryRepository, PgRepository};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for edit timestamps.
    pub clock: Arc<dyn Clock>,
    /// Process-wide id source.
    pub ids: Arc<IdGenerator>,
    /// Admin accounts.
    pub admins: Arc<dyn Repository<Admin>>,
    /// Player accounts.
    pub players: Arc<dyn Repository<Player>>,
    /// Review requests.
    pub requests: Arc<dyn Repository<Request>>,
    /// Chapters.
    pub chapters: Arc<dyn Repository<Chapter>>,
    /// Chapter nodes.
    pub nodes: Arc<dyn Repository<Node>>,
    /// Character catalogue.
    pub characters: Arc<dyn Repository<Character>>,
}

impl AppState {
    /// State backed by process-local maps.
    #[must_use]
    pub fn in_memory(clock: Arc<dyn Clock>, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            ids: Arc::new(IdGenerator::new(Arc::clone(&clock), rng)),
            clock,
            admins: Arc::new(InMemoryRepository::<Admin>::new()),
            players: Arc::new(InMemoryRepository::<Player>::new()),
            requests: Arc::new(InMemoryRepository::<Request>::new()),
            chapters: Arc::new(InMemoryRepository::<Chapter>::new()),
            nodes: Arc::new(InMemoryRepository::<Node>::new()),
            characters: Arc::new(InMemoryRepository::<Character>::new()),
        }
    }

    /// State backed by the PostgreSQL entity table. The schema must exist.
    #[must_use]
    pub fn postgres(pool: &PgPool, clock: Arc<dyn Clock>, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            ids: Arc::new(IdGenerator::new(Arc::clone(&clock), rng)),
            clock,
            admins: Arc::new(PgRepository::<Admin>::new(pool.clone())),
            players: Arc::new(PgRepository::<Player>::new(pool.clone())),
            requests: Arc::new(PgRepository::<Request>::new(pool.clone())),
            chapters: Arc::new(PgRepository::<Chapter>::new(pool.clone())),
            nodes: Arc::new(PgRepository::<Node>::new(pool.clone())),
            characters: Arc::new(PgRepository::<Character>::new(pool.clone())),
        }
    }

    /// Borrows the stores used by moderation handlers.
    #[must_use]
    pub fn moderation(&self) -> ModerationRepositories<'_> {
        ModerationRepositories {
            admins: &*self.admins,
            players: &*self.players,
            requests: &*self.requests,
            chapters: &*self.chapters,
        }
    }
}
