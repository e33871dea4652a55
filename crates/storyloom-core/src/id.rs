//! Identifier generation.
//!
//! Ids are 64-bit integers laid out as `(unix_millis << 16) | random16`, so
//! the high 48 bits sort by creation time and the low 16 bits separate ids
//! minted within the same millisecond.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;
use crate::rng::DeterministicRng;

/// Number of low bits filled with randomness.
pub const RANDOM_BITS: u32 = 16;

/// Largest value of the random component.
pub const RANDOM_MAX: u32 = (1 << RANDOM_BITS) - 1;

/// Composes an id from a millisecond timestamp and a 16-bit random value.
#[must_use]
pub fn compose_id(millis: i64, random: u32) -> i64 {
    (millis << RANDOM_BITS) | i64::from(random & RANDOM_MAX)
}

/// Splits an id back into its timestamp and random components.
#[must_use]
pub fn decompose_id(id: i64) -> (i64, u32) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let random = (id & i64::from(RANDOM_MAX)) as u32;
    (id >> RANDOM_BITS, random)
}

struct GeneratorState {
    rng: Box<dyn DeterministicRng>,
    last_issued: i64,
}

/// Produces process-unique entity identifiers.
///
/// A single generator never issues the same id twice: if the composed
/// candidate does not exceed the last issued id, `last + 1` is issued
/// instead. Ids from separate generators are not coordinated.
pub struct IdGenerator {
    clock: Arc<dyn Clock>,
    state: Mutex<GeneratorState>,
}

impl IdGenerator {
    /// Creates a generator drawing time from `clock` and low bits from `rng`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            clock,
            state: Mutex::new(GeneratorState {
                rng,
                last_issued: i64::MIN,
            }),
        }
    }

    /// Returns a new identifier.
    pub fn next_id(&self) -> i64 {
        let millis = self.clock.now_millis();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let random = state.rng.next_u32_range(0, RANDOM_MAX);
        let candidate = compose_id(millis, random);
        let id = if candidate > state.last_issued {
            candidate
        } else {
            state.last_issued + 1
        };
        state.last_issued = id;
        id
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
