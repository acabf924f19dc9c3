//! The quiz attempt engine.
//!
//! A state machine over attempt rows: None → Active (started) →
//! Submitted (auto-graded) → Reviewed (curator override). Every
//! transition validates its preconditions inside a single store
//! operation, so concurrent duplicate submits or double reviews lose the
//! race instead of double-grading.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{QuizError, StoreError};
use crate::model::Lesson;
use crate::progress::{AttemptId, LessonProgress, ProgressStatus, QuizAttempt};
use crate::quiz::{self, AnswerMap, QuizConfig};
use crate::traits::{AttemptStore, BeginAttempt, GradedSubmission, ProgressUpdate, ReviewUpdate};

/// Observer for lesson completion events, consumed by course-progress
/// aggregation, certificate issuance, and notification collaborators.
pub trait CompletionListener: Send + Sync {
    fn on_lesson_completed(&self, user_id: &str, lesson_id: &str);
    fn on_lesson_failed(&self, user_id: &str, lesson_id: &str);
    fn on_review_queued(&self, attempt: &QuizAttempt);
}

/// No-op completion listener.
pub struct NoopListener;

impl CompletionListener for NoopListener {
    fn on_lesson_completed(&self, _: &str, _: &str) {}
    fn on_lesson_failed(&self, _: &str, _: &str) {}
    fn on_review_queued(&self, _: &QuizAttempt) {}
}

/// Outcome of a start request.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// A fresh attempt was opened.
    Started(QuizAttempt),
    /// An active attempt exists within its time limit; it is returned
    /// instead of opening a new one.
    Resumed(QuizAttempt),
    /// An active attempt exists but its time limit has elapsed; it is
    /// eligible for auto-submission, not silently replaced.
    TimeExpired(QuizAttempt),
    /// The attempt bound is spent. A normal terminal outcome, not an
    /// error; `attempts_left` is 0.
    MaxAttemptsReached { attempts_used: u32 },
}

impl StartOutcome {
    /// Attempts remaining after this outcome, given the configured bound.
    pub fn attempts_left(&self, max_attempts: u32) -> u32 {
        match self {
            StartOutcome::Started(a) | StartOutcome::Resumed(a) | StartOutcome::TimeExpired(a) => {
                max_attempts.saturating_sub(a.attempt_number)
            }
            StartOutcome::MaxAttemptsReached { .. } => 0,
        }
    }
}

/// A graded attempt as returned to the quiz UI.
#[derive(Debug, Clone)]
pub struct Submission {
    pub attempt: QuizAttempt,
    pub score: u8,
    pub is_passed: bool,
    pub requires_review: bool,
    pub time_spent_secs: u32,
}

/// Drives attempt creation, resumption, timing, grading, and review.
pub struct QuizEngine {
    store: Arc<dyn AttemptStore>,
    listener: Arc<dyn CompletionListener>,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn AttemptStore>) -> Self {
        Self {
            store,
            listener: Arc::new(NoopListener),
        }
    }

    pub fn with_listener(store: Arc<dyn AttemptStore>, listener: Arc<dyn CompletionListener>) -> Self {
        Self { store, listener }
    }

    fn quiz_config<'a>(lesson: &'a Lesson) -> Result<&'a QuizConfig, QuizError> {
        lesson
            .quiz
            .as_ref()
            .filter(|_| lesson.is_quiz())
            .ok_or_else(|| QuizError::NotAQuiz(lesson.id.clone()))
    }

    /// Start a new attempt, or resume/report the active one.
    pub async fn start(
        &self,
        user_id: &str,
        lesson: &Lesson,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome, QuizError> {
        let config = Self::quiz_config(lesson)?;

        let outcome = match self
            .store
            .begin_attempt(user_id, &lesson.id, config.max_attempts, now)
            .await?
        {
            BeginAttempt::Created(attempt) => {
                tracing::info!(
                    user_id,
                    lesson_id = %lesson.id,
                    attempt_number = attempt.attempt_number,
                    "quiz attempt started"
                );
                self.touch_progress(user_id, &lesson.id).await?;
                StartOutcome::Started(attempt)
            }
            BeginAttempt::Existing(attempt) => {
                let expired = config
                    .time_limit_secs
                    .is_some_and(|limit| attempt.elapsed_secs(now) >= limit);
                if expired {
                    StartOutcome::TimeExpired(attempt)
                } else {
                    StartOutcome::Resumed(attempt)
                }
            }
            BeginAttempt::Exhausted { attempts_used } => {
                StartOutcome::MaxAttemptsReached { attempts_used }
            }
        };

        Ok(outcome)
    }

    /// Submit answers for an active attempt and auto-grade them.
    pub async fn submit(
        &self,
        lesson: &Lesson,
        attempt_id: AttemptId,
        answers: AnswerMap,
        now: DateTime<Utc>,
    ) -> Result<Submission, QuizError> {
        let config = Self::quiz_config(lesson)?;

        let attempt = self
            .store
            .attempt(attempt_id)
            .await?
            .ok_or(QuizError::AttemptNotFound(attempt_id))?;
        if !attempt.is_active() {
            return Err(QuizError::AlreadySubmitted(attempt_id));
        }

        // Same boundary as `start`: at exactly the limit the attempt is
        // expired, not submittable.
        let time_spent = attempt.elapsed_secs(now);
        if let Some(limit) = config.time_limit_secs {
            if time_spent >= limit {
                return Err(QuizError::TimeLimitExceeded {
                    limit_secs: limit,
                    spent_secs: time_spent,
                });
            }
        }

        let breakdown = quiz::grade(&config.questions, &answers);
        let requires_review = breakdown.requires_review || config.requires_review;
        let passed_score = breakdown.score >= config.passing_score;
        // A pass is only final without pending review.
        let is_passed = passed_score && !requires_review;

        let stored = self
            .store
            .submit_attempt(
                attempt_id,
                GradedSubmission {
                    answers,
                    score: breakdown.score,
                    is_passed,
                    is_auto_graded: !requires_review,
                    requires_review,
                    submitted_at: now,
                    time_spent_secs: time_spent,
                },
            )
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => QuizError::AlreadySubmitted(attempt_id),
                StoreError::AttemptNotFound(id) => QuizError::AttemptNotFound(id),
                other => QuizError::Store(other),
            })?;

        if requires_review {
            // Outcome unresolved until a curator rules; keep the row open.
            self.store
                .upsert_progress(
                    &stored.user_id,
                    &stored.lesson_id,
                    ProgressUpdate {
                        status: ProgressStatus::InProgress,
                        completed_at: None,
                        watched_secs: None,
                    },
                )
                .await?;
            self.listener.on_review_queued(&stored);
        } else {
            self.resolve_progress(&stored.user_id, &stored.lesson_id, is_passed, now)
                .await?;
        }

        Ok(Submission {
            score: breakdown.score,
            is_passed,
            requires_review,
            time_spent_secs: time_spent,
            attempt: stored,
        })
    }

    /// Curator review of an attempt held with `requires_review`.
    pub async fn review(
        &self,
        lesson: &Lesson,
        attempt_id: AttemptId,
        curator_id: &str,
        score: u8,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Submission, QuizError> {
        let config = Self::quiz_config(lesson)?;
        let score = score.min(100);

        let attempt = self
            .store
            .attempt(attempt_id)
            .await?
            .ok_or(QuizError::AttemptNotFound(attempt_id))?;
        if !attempt.requires_review {
            return Err(QuizError::NoReviewNeeded(attempt_id));
        }

        let is_passed = score >= config.passing_score;
        let stored = self
            .store
            .review_attempt(
                attempt_id,
                ReviewUpdate {
                    curator_id: curator_id.to_string(),
                    comment,
                    score,
                    is_passed,
                },
            )
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => QuizError::NoReviewNeeded(attempt_id),
                StoreError::AttemptNotFound(id) => QuizError::AttemptNotFound(id),
                other => QuizError::Store(other),
            })?;

        tracing::info!(
            attempt_id = %attempt_id,
            curator_id,
            score,
            is_passed,
            "quiz attempt reviewed"
        );
        self.resolve_progress(&stored.user_id, &stored.lesson_id, is_passed, now)
            .await?;

        let time_spent = stored.time_spent_secs.unwrap_or(0);
        Ok(Submission {
            score,
            is_passed,
            requires_review: false,
            time_spent_secs: time_spent,
            attempt: stored,
        })
    }

    /// Delete all attempts for (user, lesson) and reset progress, to
    /// grant extra attempts outside the normal bound.
    pub async fn reset(
        &self,
        user_id: &str,
        lesson_id: &str,
        reset_by: &str,
    ) -> Result<u32, QuizError> {
        let removed = self.store.delete_attempts(user_id, lesson_id).await?;
        self.store
            .upsert_progress(
                user_id,
                lesson_id,
                ProgressUpdate {
                    status: ProgressStatus::NotStarted,
                    completed_at: None,
                    watched_secs: Some(0),
                },
            )
            .await?;
        tracing::info!(user_id, lesson_id, reset_by, removed, "quiz attempts reset");
        Ok(removed)
    }

    /// Submitted attempts waiting on a curator.
    pub async fn review_queue(&self) -> Result<Vec<QuizAttempt>, QuizError> {
        Ok(self.store.review_queue().await?)
    }

    /// Record viewing progress. Non-quiz lessons complete on view; quiz
    /// lessons only complete through grading.
    pub async fn mark_viewed(
        &self,
        user_id: &str,
        lesson: &Lesson,
        watched_secs: u32,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, QuizError> {
        let update = if lesson.is_quiz() {
            ProgressUpdate {
                status: ProgressStatus::InProgress,
                completed_at: None,
                watched_secs: Some(watched_secs),
            }
        } else {
            ProgressUpdate {
                status: ProgressStatus::Completed,
                completed_at: Some(now),
                watched_secs: Some(watched_secs),
            }
        };
        let completes = !lesson.is_quiz();

        let progress = self
            .store
            .upsert_progress(user_id, &lesson.id, update)
            .await?;
        if completes {
            tracing::info!(user_id, lesson_id = %lesson.id, "lesson completed");
            self.listener.on_lesson_completed(user_id, &lesson.id);
        }
        Ok(progress)
    }

    /// Ensure a progress row exists once the learner interacts with the
    /// lesson, without clobbering a terminal state.
    async fn touch_progress(&self, user_id: &str, lesson_id: &str) -> Result<(), StoreError> {
        let current = self.store.progress(user_id, lesson_id).await?;
        if current.is_none_or(|p| p.status == ProgressStatus::NotStarted) {
            self.store
                .upsert_progress(
                    user_id,
                    lesson_id,
                    ProgressUpdate {
                        status: ProgressStatus::InProgress,
                        completed_at: None,
                        watched_secs: None,
                    },
                )
                .await?;
        }
        Ok(())
    }

    async fn resolve_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        is_passed: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let update = if is_passed {
            ProgressUpdate {
                status: ProgressStatus::Completed,
                completed_at: Some(now),
                watched_secs: None,
            }
        } else {
            ProgressUpdate {
                status: ProgressStatus::Failed,
                completed_at: None,
                watched_secs: None,
            }
        };
        self.store.upsert_progress(user_id, lesson_id, update).await?;

        if is_passed {
            tracing::info!(user_id, lesson_id, "lesson completed");
            self.listener.on_lesson_completed(user_id, lesson_id);
        } else {
            tracing::info!(user_id, lesson_id, "lesson failed");
            self.listener.on_lesson_failed(user_id, lesson_id);
        }
        Ok(())
    }
}
