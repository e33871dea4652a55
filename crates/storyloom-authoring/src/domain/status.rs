//! Chapter publication state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use storyloom_core::error::DomainError;

/// Publication state of a chapter.
///
/// Persisted as its integer code: `1` draft, `2` pending review,
/// `3` published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ChapterStatus {
    /// Newly created or being edited.
    #[default]
    Draft,
    /// Submitted and waiting for a reviewer.
    PendingReview,
    /// Visible to players.
    Published,
}

impl ChapterStatus {
    /// Integer code of the status.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Draft => 1,
            Self::PendingReview => 2,
            Self::Published => 3,
        }
    }

    /// Transition taken when a chapter is submitted for review.
    ///
    /// Resubmitting a pending chapter leaves it pending.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a published chapter.
    pub fn submit_for_review(self) -> Result<Self, DomainError> {
        match self {
            Self::Draft | Self::PendingReview => Ok(Self::PendingReview),
            Self::Published => Err(DomainError::Validation(
                "published chapter cannot be submitted for review".into(),
            )),
        }
    }
}

impl From<ChapterStatus> for i32 {
    fn from(status: ChapterStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for ChapterStatus {
    type Error = DomainError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Draft),
            2 => Ok(Self::PendingReview),
            3 => Ok(Self::Published),
            other => Err(DomainError::Validation(format!(
                "unknown chapter status {other}"
            ))),
        }
    }
}

impl fmt::Display for ChapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Published => "published",
        };
        f.write_str(name)
    }
}
