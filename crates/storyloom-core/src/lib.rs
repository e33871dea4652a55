//! Storyloom Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that all bounded
//! contexts depend on: identifiers, the entity store contract, time and
//! randomness seams, and the domain error type. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod entity;
pub mod error;
pub mod id;
pub mod repository;
pub mod rng;
pub mod wire;
