//! Per-learner progress and quiz attempt rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quiz::AnswerMap;
use crate::model::{LessonId, UserId};

/// Quiz attempt identifier.
pub type AttemptId = Uuid;

/// Completion state of a lesson for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        ProgressStatus::NotStarted
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::NotStarted => write!(f, "not_started"),
            ProgressStatus::InProgress => write!(f, "in_progress"),
            ProgressStatus::Completed => write!(f, "completed"),
            ProgressStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Progress of one learner on one lesson. Exactly one row per
/// (user, lesson) pair; upserted, never duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub status: ProgressStatus,
    /// Seconds of video watched, for video lessons.
    #[serde(default)]
    pub watched_secs: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LessonProgress {
    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

/// Snapshot of a learner's progress keyed by lesson id, as read at the
/// start of an evaluation.
pub type ProgressMap = HashMap<LessonId, LessonProgress>;

/// One timed try at a graded quiz lesson.
///
/// Created by `start`, mutated once by `submit` and at most once more by
/// curator review. At most one attempt per (user, lesson) may have
/// `submitted_at = None` at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    /// Monotonically increasing per (user, lesson).
    pub attempt_number: u32,
    #[serde(default)]
    pub answers: AnswerMap,
    /// Percentage score, 0–100; `None` until graded.
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub is_passed: bool,
    #[serde(default)]
    pub is_auto_graded: bool,
    /// Held for curator review; only a review transition may clear this.
    #[serde(default)]
    pub requires_review: bool,
    #[serde(default)]
    pub curator_id: Option<UserId>,
    #[serde(default)]
    pub curator_comment: Option<String>,
    pub started_at: DateTime<Utc>,
    /// `None` while the attempt is active.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_spent_secs: Option<u32>,
}

impl QuizAttempt {
    /// A fresh active attempt.
    pub fn started(
        user_id: &str,
        lesson_id: &str,
        attempt_number: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            lesson_id: lesson_id.to_string(),
            attempt_number,
            answers: AnswerMap::new(),
            score: None,
            is_passed: false,
            is_auto_graded: false,
            requires_review: false,
            curator_id: None,
            curator_comment: None,
            started_at,
            submitted_at: None,
            time_spent_secs: None,
        }
    }

    /// True while the attempt has not been submitted.
    pub fn is_active(&self) -> bool {
        self.submitted_at.is_none()
    }

    /// Whole seconds elapsed since the attempt started (0 if `now` is
    /// somehow earlier).
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        (now - self.started_at).num_seconds().max(0) as u32
    }
}
