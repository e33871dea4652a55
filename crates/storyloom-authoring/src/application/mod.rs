//! Application services for the Chapter Authoring context.

pub mod command_handlers;
pub mod query_handlers;
