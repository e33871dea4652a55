//! Domain model for the Moderation context.

pub mod aggregates;
pub mod commands;
pub mod request;
