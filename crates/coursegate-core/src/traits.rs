//! Store trait definitions.
//!
//! Implementations live outside this crate (`coursegate-store` ships the
//! in-memory one). Every method is one atomic unit of work: the store
//! reads current state, validates the stated precondition, and writes
//! under a single transaction boundary. Lost races surface as
//! `StoreError::Conflict`, never as silent double-writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{LessonId, UserId};
use crate::progress::{AttemptId, LessonProgress, ProgressMap, ProgressStatus, QuizAttempt};
use crate::quiz::AnswerMap;

/// Fields applied by a progress upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub status: ProgressStatus,
    /// Written as-is; pass `None` to clear.
    pub completed_at: Option<DateTime<Utc>>,
    /// `None` keeps the stored value.
    pub watched_secs: Option<u32>,
}

/// Per-user-per-lesson completion state with atomic upsert.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn progress(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>, StoreError>;

    /// Snapshot of one user's progress over the given lessons.
    async fn progress_snapshot(
        &self,
        user_id: &str,
        lesson_ids: &[LessonId],
    ) -> Result<ProgressMap, StoreError>;

    /// Create-or-update the single (user, lesson) row. Two concurrent
    /// calls must never produce two rows.
    async fn upsert_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        update: ProgressUpdate,
    ) -> Result<LessonProgress, StoreError>;
}

/// Outcome of the atomic begin-attempt operation.
#[derive(Debug, Clone)]
pub enum BeginAttempt {
    /// A new attempt was created with the next attempt number.
    Created(QuizAttempt),
    /// An active (unsubmitted) attempt already exists; no row was created.
    Existing(QuizAttempt),
    /// The attempt bound is spent; no row was created.
    Exhausted { attempts_used: u32 },
}

/// Grading result written by a submit transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedSubmission {
    pub answers: AnswerMap,
    pub score: u8,
    pub is_passed: bool,
    pub is_auto_graded: bool,
    pub requires_review: bool,
    pub submitted_at: DateTime<Utc>,
    pub time_spent_secs: u32,
}

/// Curator decision written by a review transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub curator_id: UserId,
    pub comment: Option<String>,
    pub score: u8,
    pub is_passed: bool,
}

/// Quiz attempt rows with transactional transitions.
#[async_trait]
pub trait AttemptStore: ProgressStore {
    async fn attempt(&self, id: AttemptId) -> Result<Option<QuizAttempt>, StoreError>;

    /// All attempts for (user, lesson), in attempt-number order.
    async fn attempts(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Vec<QuizAttempt>, StoreError>;

    /// Atomically resume the active attempt, create the next numbered
    /// attempt, or refuse when `max_attempts` is spent. Guarantees at
    /// most one active attempt per (user, lesson).
    async fn begin_attempt(
        &self,
        user_id: &str,
        lesson_id: &str,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<BeginAttempt, StoreError>;

    /// Compare-and-set on `submitted_at = None`. A lost race returns
    /// `StoreError::Conflict`.
    async fn submit_attempt(
        &self,
        id: AttemptId,
        submission: GradedSubmission,
    ) -> Result<QuizAttempt, StoreError>;

    /// Compare-and-set on `requires_review = true`. A second review of
    /// the same attempt returns `StoreError::Conflict`.
    async fn review_attempt(
        &self,
        id: AttemptId,
        review: ReviewUpdate,
    ) -> Result<QuizAttempt, StoreError>;

    /// Submitted attempts still waiting on a curator.
    async fn review_queue(&self) -> Result<Vec<QuizAttempt>, StoreError>;

    /// Delete every attempt for (user, lesson); returns how many were
    /// removed.
    async fn delete_attempts(&self, user_id: &str, lesson_id: &str) -> Result<u32, StoreError>;
}
