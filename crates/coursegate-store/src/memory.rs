//! In-memory store.
//!
//! Every trait method takes the single mutex for its whole duration, so
//! each call is one atomic unit of work. Precondition checks and writes
//! happen under the same lock; a caller that loses a race gets
//! `StoreError::Conflict` back.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coursegate_core::error::StoreError;
use coursegate_core::model::{LessonId, UserId};
use coursegate_core::progress::{AttemptId, LessonProgress, ProgressMap, QuizAttempt};
use coursegate_core::traits::{
    AttemptStore, BeginAttempt, GradedSubmission, ProgressStore, ProgressUpdate, ReviewUpdate,
};

#[derive(Default)]
struct Inner {
    progress: HashMap<(UserId, LessonId), LessonProgress>,
    attempts: Vec<QuizAttempt>,
}

/// In-memory progress and attempt store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Backend(format!("store mutex poisoned: {e}")))
    }

    /// Seed a progress row directly, for test setup.
    pub fn seed_progress(&self, progress: LessonProgress) {
        let mut inner = self.inner.lock().unwrap();
        inner.progress.insert(
            (progress.user_id.clone(), progress.lesson_id.clone()),
            progress,
        );
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn progress(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .progress
            .get(&(user_id.to_string(), lesson_id.to_string()))
            .cloned())
    }

    async fn progress_snapshot(
        &self,
        user_id: &str,
        lesson_ids: &[LessonId],
    ) -> Result<ProgressMap, StoreError> {
        let inner = self.lock()?;
        Ok(lesson_ids
            .iter()
            .filter_map(|lesson_id| {
                inner
                    .progress
                    .get(&(user_id.to_string(), lesson_id.clone()))
                    .map(|p| (lesson_id.clone(), p.clone()))
            })
            .collect())
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        update: ProgressUpdate,
    ) -> Result<LessonProgress, StoreError> {
        let mut inner = self.lock()?;
        let key = (user_id.to_string(), lesson_id.to_string());

        let row = inner
            .progress
            .entry(key)
            .or_insert_with(|| LessonProgress {
                user_id: user_id.to_string(),
                lesson_id: lesson_id.to_string(),
                status: Default::default(),
                watched_secs: 0,
                completed_at: None,
            });

        row.status = update.status;
        row.completed_at = update.completed_at;
        if let Some(watched) = update.watched_secs {
            row.watched_secs = watched;
        }

        Ok(row.clone())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn attempt(&self, id: AttemptId) -> Result<Option<QuizAttempt>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn attempts(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<Vec<QuizAttempt>, StoreError> {
        let inner = self.lock()?;
        let mut attempts: Vec<QuizAttempt> = inner
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.lesson_id == lesson_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.attempt_number);
        Ok(attempts)
    }

    async fn begin_attempt(
        &self,
        user_id: &str,
        lesson_id: &str,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<BeginAttempt, StoreError> {
        let mut inner = self.lock()?;

        let existing = inner
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.lesson_id == lesson_id)
            .collect::<Vec<_>>();

        if let Some(active) = existing.iter().find(|a| a.is_active()) {
            return Ok(BeginAttempt::Existing((*active).clone()));
        }

        let used = existing.len() as u32;
        if used >= max_attempts {
            return Ok(BeginAttempt::Exhausted {
                attempts_used: used,
            });
        }

        let next_number = existing
            .iter()
            .map(|a| a.attempt_number)
            .max()
            .unwrap_or(0)
            + 1;
        let attempt = QuizAttempt::started(user_id, lesson_id, next_number, now);
        tracing::debug!(user_id, lesson_id, attempt_number = next_number, "attempt created");
        inner.attempts.push(attempt.clone());
        Ok(BeginAttempt::Created(attempt))
    }

    async fn submit_attempt(
        &self,
        id: AttemptId,
        submission: GradedSubmission,
    ) -> Result<QuizAttempt, StoreError> {
        let mut inner = self.lock()?;
        let attempt = inner
            .attempts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::AttemptNotFound(id))?;

        if attempt.submitted_at.is_some() {
            return Err(StoreError::Conflict(format!(
                "attempt {id} already submitted"
            )));
        }

        attempt.answers = submission.answers;
        attempt.score = Some(submission.score);
        attempt.is_passed = submission.is_passed;
        attempt.is_auto_graded = submission.is_auto_graded;
        attempt.requires_review = submission.requires_review;
        attempt.submitted_at = Some(submission.submitted_at);
        attempt.time_spent_secs = Some(submission.time_spent_secs);

        Ok(attempt.clone())
    }

    async fn review_attempt(
        &self,
        id: AttemptId,
        review: ReviewUpdate,
    ) -> Result<QuizAttempt, StoreError> {
        let mut inner = self.lock()?;
        let attempt = inner
            .attempts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::AttemptNotFound(id))?;

        if !attempt.requires_review {
            return Err(StoreError::Conflict(format!(
                "attempt {id} is not awaiting review"
            )));
        }

        attempt.requires_review = false;
        attempt.curator_id = Some(review.curator_id);
        attempt.curator_comment = review.comment;
        attempt.score = Some(review.score);
        attempt.is_passed = review.is_passed;

        Ok(attempt.clone())
    }

    async fn review_queue(&self) -> Result<Vec<QuizAttempt>, StoreError> {
        let inner = self.lock()?;
        let mut queue: Vec<QuizAttempt> = inner
            .attempts
            .iter()
            .filter(|a| a.requires_review && a.submitted_at.is_some())
            .cloned()
            .collect();
        queue.sort_by_key(|a| a.submitted_at);
        Ok(queue)
    }

    async fn delete_attempts(&self, user_id: &str, lesson_id: &str) -> Result<u32, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.attempts.len();
        inner
            .attempts
            .retain(|a| !(a.user_id == user_id && a.lesson_id == lesson_id));
        Ok((before - inner.attempts.len()) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use coursegate_core::progress::ProgressStatus;
    use coursegate_core::quiz::AnswerMap;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn submission(score: u8) -> GradedSubmission {
        GradedSubmission {
            answers: AnswerMap::new(),
            score,
            is_passed: score >= 70,
            is_auto_graded: true,
            requires_review: false,
            submitted_at: now(),
            time_spent_secs: 120,
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_updates_single_row() {
        let store = MemoryStore::new();

        let created = store
            .upsert_progress(
                "u1",
                "l1",
                ProgressUpdate {
                    status: ProgressStatus::InProgress,
                    completed_at: None,
                    watched_secs: Some(30),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.status, ProgressStatus::InProgress);
        assert_eq!(created.watched_secs, 30);

        let updated = store
            .upsert_progress(
                "u1",
                "l1",
                ProgressUpdate {
                    status: ProgressStatus::Completed,
                    completed_at: Some(now()),
                    watched_secs: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ProgressStatus::Completed);
        // Unspecified watched_secs keeps the stored value.
        assert_eq!(updated.watched_secs, 30);

        let snapshot = store
            .progress_snapshot("u1", &["l1".to_string(), "l2".to_string()])
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn begin_attempt_numbers_monotonically() {
        let store = MemoryStore::new();

        let first = match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };
        assert_eq!(first.attempt_number, 1);

        store.submit_attempt(first.id, submission(40)).await.unwrap();

        let second = match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };
        assert_eq!(second.attempt_number, 2);
    }

    #[tokio::test]
    async fn begin_attempt_returns_active_instead_of_creating() {
        let store = MemoryStore::new();

        let first = match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };

        match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Existing(a) => assert_eq!(a.id, first.id),
            other => panic!("expected Existing, got {other:?}"),
        }
        assert_eq!(store.attempts("u1", "l1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn begin_attempt_refuses_past_bound() {
        let store = MemoryStore::new();

        for _ in 0..2 {
            let attempt = match store.begin_attempt("u1", "l1", 2, now()).await.unwrap() {
                BeginAttempt::Created(a) => a,
                other => panic!("expected Created, got {other:?}"),
            };
            store
                .submit_attempt(attempt.id, submission(40))
                .await
                .unwrap();
        }

        match store.begin_attempt("u1", "l1", 2, now()).await.unwrap() {
            BeginAttempt::Exhausted { attempts_used } => assert_eq!(attempts_used, 2),
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn double_submit_conflicts() {
        let store = MemoryStore::new();
        let attempt = match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };

        store
            .submit_attempt(attempt.id, submission(80))
            .await
            .unwrap();
        let second = store.submit_attempt(attempt.id, submission(90)).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));

        // The first write stands.
        let stored = store.attempt(attempt.id).await.unwrap().unwrap();
        assert_eq!(stored.score, Some(80));
    }

    #[tokio::test]
    async fn concurrent_submits_one_wins() {
        let store = Arc::new(MemoryStore::new());
        let attempt = match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };

        let a = {
            let store = Arc::clone(&store);
            let id = attempt.id;
            tokio::spawn(async move { store.submit_attempt(id, submission(80)).await })
        };
        let b = {
            let store = Arc::clone(&store);
            let id = attempt.id;
            tokio::spawn(async move { store.submit_attempt(id, submission(90)).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::Conflict(_))))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn review_clears_flag_and_conflicts_on_repeat() {
        let store = MemoryStore::new();
        let attempt = match store.begin_attempt("u1", "l1", 3, now()).await.unwrap() {
            BeginAttempt::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };
        store
            .submit_attempt(
                attempt.id,
                GradedSubmission {
                    requires_review: true,
                    is_auto_graded: false,
                    ..submission(50)
                },
            )
            .await
            .unwrap();

        assert_eq!(store.review_queue().await.unwrap().len(), 1);

        let reviewed = store
            .review_attempt(
                attempt.id,
                ReviewUpdate {
                    curator_id: "curator-1".into(),
                    comment: Some("good work".into()),
                    score: 85,
                    is_passed: true,
                },
            )
            .await
            .unwrap();
        assert!(!reviewed.requires_review);
        assert!(reviewed.is_passed);
        assert!(store.review_queue().await.unwrap().is_empty());

        let again = store
            .review_attempt(
                attempt.id,
                ReviewUpdate {
                    curator_id: "curator-2".into(),
                    comment: None,
                    score: 10,
                    is_passed: false,
                },
            )
            .await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_attempts_counts_removed() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            let attempt = match store.begin_attempt("u1", "l1", 5, now()).await.unwrap() {
                BeginAttempt::Created(a) => a,
                other => panic!("expected Created, got {other:?}"),
            };
            store
                .submit_attempt(attempt.id, submission(30))
                .await
                .unwrap();
        }
        store.begin_attempt("u2", "l1", 5, now()).await.unwrap();

        assert_eq!(store.delete_attempts("u1", "l1").await.unwrap(), 2);
        assert!(store.attempts("u1", "l1").await.unwrap().is_empty());
        // Other users' attempts untouched.
        assert_eq!(store.attempts("u2", "l1").await.unwrap().len(), 1);
    }
}
