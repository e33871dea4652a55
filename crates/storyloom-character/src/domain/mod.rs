//! Domain model for the Character Catalogue context.

pub mod aggregates;
pub mod commands;
