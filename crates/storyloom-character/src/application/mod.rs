//! Application services for the Character Catalogue context.

pub mod command_handlers;
pub mod query_handlers;
