//! Domain model for the Chapter Authoring context.

pub mod aggregates;
pub mod commands;
pub mod status;
