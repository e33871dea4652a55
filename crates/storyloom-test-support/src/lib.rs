//! Shared test mocks and utilities for the Storyloom authoring service.

mod clock;
mod repository;
mod rng;

use std::sync::Arc;

use storyloom_core::id::IdGenerator;

pub use clock::{FixedClock, fixed_now};
pub use repository::{FailingRepository, FaultyRepository};
pub use rng::{MockRng, SequenceRng};

/// An id generator pinned to [`fixed_now`] with zeroed random bits, so ids
/// come out as consecutive integers.
#[must_use]
pub fn fixed_id_generator() -> IdGenerator {
    IdGenerator::new(Arc::new(FixedClock(fixed_now())), Box::new(MockRng))
}
