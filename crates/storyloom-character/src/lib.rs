//! Storyloom: Character Catalogue bounded context.
//!
//! Characters are shared reference data: chapters list them by id, and
//! each carries the emotion assets the reader shows for it.

pub mod application;
pub mod domain;
