//! Application services for the Moderation context.

pub mod command_handlers;
pub mod query_handlers;

use storyloom_authoring::domain::aggregates::Chapter;
use storyloom_core::repository::Repository;

use crate::domain::aggregates::{Admin, Player};
use crate::domain::request::Request;

/// The stores moderation handlers read and write.
#[derive(Clone, Copy)]
pub struct ModerationRepositories<'a> {
    /// Admin accounts.
    pub admins: &'a dyn Repository<Admin>,
    /// Player accounts.
    pub players: &'a dyn Repository<Player>,
    /// Review requests.
    pub requests: &'a dyn Repository<Request>,
    /// Chapters targeted by publication requests.
    pub chapters: &'a dyn Repository<Chapter>,
}
