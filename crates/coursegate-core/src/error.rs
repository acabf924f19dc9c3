//! Error taxonomy.
//!
//! Every domain condition is a typed, recoverable value returned to the
//! caller; only genuine storage failures surface as `StoreError::Backend`.

use thiserror::Error;

use crate::model::EnrollmentStatus;
use crate::progress::AttemptId;

/// Why the enrollment gate refused to evaluate a course.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrollmentError {
    #[error("user is not enrolled in this course")]
    NotEnrolled,

    #[error("enrollment is not active (status: {status})")]
    Inactive { status: EnrollmentStatus },

    #[error("enrollment expired at {expired_at}")]
    Expired {
        expired_at: chrono::DateTime<chrono::Utc>,
    },
}

/// Errors surfaced by a progress/attempt store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("attempt not found: {0}")]
    AttemptNotFound(AttemptId),

    /// A precondition no longer held when the write executed (e.g. the
    /// attempt was submitted by a concurrent request).
    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True for lost compare-and-set races, which map to domain
    /// conditions rather than infrastructure failures.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// Errors and refused transitions of the quiz attempt engine.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("lesson {0} is not a quiz")]
    NotAQuiz(String),

    #[error("attempt not found: {0}")]
    AttemptNotFound(AttemptId),

    #[error("attempt {0} was already submitted")]
    AlreadySubmitted(AttemptId),

    #[error("time limit of {limit_secs}s exceeded ({spent_secs}s spent)")]
    TimeLimitExceeded { limit_secs: u32, spent_secs: u32 },

    #[error("attempt {0} does not require review")]
    NoReviewNeeded(AttemptId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
