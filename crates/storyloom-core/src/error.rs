//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An entity was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The entity kind that was looked up.
        kind: &'static str,
        /// The missing identifier.
        id: i64,
    },

    /// The entity (or a unique attribute of it) already exists.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Email/password pair did not match a stored admin.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {kind} {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The entity kind that had the conflict.
        kind: &'static str,
        /// The entity that had the conflict.
        id: i64,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The registration approval request could not be created or fanned out.
    #[error("failed to send registration request to reviewers: {0}")]
    RegistrationRequestFailed(String),

    /// The player record mirroring a new admin could not be created.
    #[error("failed to create player for admin: {0}")]
    PlayerMirrorFailed(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Returns `true` for [`DomainError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
