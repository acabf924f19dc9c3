//! The per-lesson availability verdict.
//!
//! Composes the enrollment gate, eligibility allow-lists, drip scheduling,
//! and checkpoint gating into one pure evaluation over immutable snapshots
//! of enrollment/progress/content data. Nothing here mutates state, so it
//! can run on any number of concurrent requests without coordination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drip::{self, DripAnchor};
use crate::eligibility::{self, ModuleGate};
use crate::error::EnrollmentError;
use crate::model::{Course, CourseId, Enrollment, LessonId, User};
use crate::prerequisites;
use crate::progress::ProgressMap;

/// Immutable inputs for one availability evaluation.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub user: &'a User,
    /// The (user, course) enrollment, if one exists.
    pub enrollment: Option<&'a Enrollment>,
    /// Snapshot of the learner's progress for this course.
    pub progress: &'a ProgressMap,
    /// Evaluation instant; passed explicitly for determinism.
    pub now: DateTime<Utc>,
}

/// Why a lesson is locked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockedReason {
    /// An admin closed the module for this enrollment.
    RestrictedManually,
    TierMismatch,
    TrackMismatch,
    GroupMismatch,
    /// The drip window has not opened yet.
    DripLocked,
    HardDeadlinePassed,
    /// An earlier checkpoint lesson is not completed.
    CheckpointIncomplete { lesson_id: LessonId },
}

impl std::fmt::Display for BlockedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockedReason::RestrictedManually => write!(f, "closed by administrator"),
            BlockedReason::TierMismatch => write!(f, "subscription tier not allowed"),
            BlockedReason::TrackMismatch => write!(f, "learning track not allowed"),
            BlockedReason::GroupMismatch => write!(f, "not a member of an allowed cohort"),
            BlockedReason::DripLocked => write!(f, "not yet unlocked"),
            BlockedReason::HardDeadlinePassed => write!(f, "deadline passed"),
            BlockedReason::CheckpointIncomplete { lesson_id } => {
                write!(f, "blocked by checkpoint {lesson_id}")
            }
        }
    }
}

/// Availability verdict for one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonAccess {
    pub lesson_id: LessonId,
    pub is_available: bool,
    /// Earliest opening instant, when computable.
    #[serde(default)]
    pub available_date: Option<DateTime<Utc>>,
    /// The soft deadline has passed; work is accepted but marked late.
    #[serde(default)]
    pub is_late: bool,
    #[serde(default)]
    pub blocked: Option<BlockedReason>,
}

impl LessonAccess {
    fn unavailable(lesson_id: &str, blocked: Option<BlockedReason>) -> Self {
        Self {
            lesson_id: lesson_id.to_string(),
            is_available: false,
            available_date: None,
            is_late: false,
            blocked,
        }
    }
}

/// Availability of every lesson in a course, in sequence order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAvailability {
    pub course_id: CourseId,
    pub evaluated_at: DateTime<Utc>,
    pub lessons: Vec<LessonAccess>,
}

/// Counts consumed by course-progress aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub total: usize,
    pub available: usize,
    pub locked: usize,
    pub completed: usize,
}

impl CourseAvailability {
    pub fn get(&self, lesson_id: &str) -> Option<&LessonAccess> {
        self.lessons.iter().find(|l| l.lesson_id == lesson_id)
    }

    pub fn summary(&self, progress: &ProgressMap) -> AvailabilitySummary {
        let available = self.lessons.iter().filter(|l| l.is_available).count();
        let completed = self
            .lessons
            .iter()
            .filter(|l| {
                progress
                    .get(&l.lesson_id)
                    .is_some_and(|p| p.is_completed())
            })
            .count();
        AvailabilitySummary {
            total: self.lessons.len(),
            available,
            locked: self.lessons.len() - available,
            completed,
        }
    }
}

/// The single entry guard: refuse evaluation without an active,
/// unexpired enrollment.
pub fn enrollment_gate<'a>(
    enrollment: Option<&'a Enrollment>,
    now: DateTime<Utc>,
) -> Result<&'a Enrollment, EnrollmentError> {
    let enrollment = enrollment.ok_or(EnrollmentError::NotEnrolled)?;
    if !enrollment.is_active() {
        return Err(EnrollmentError::Inactive {
            status: enrollment.status,
        });
    }
    if enrollment.is_expired_at(now) {
        return Err(EnrollmentError::Expired {
            expired_at: enrollment.expires_at.unwrap_or(now),
        });
    }
    Ok(enrollment)
}

/// Evaluate availability of every lesson in a course for one learner.
pub fn evaluate_course(
    course: &Course,
    ctx: &AccessContext<'_>,
) -> Result<CourseAvailability, EnrollmentError> {
    let enrollment = enrollment_gate(ctx.enrollment, ctx.now)?;
    let anchor = DripAnchor::resolve(ctx.user, enrollment);
    let sequence = course.sequence();
    let track = ctx.user.track.as_deref();

    let mut lessons = Vec::with_capacity(sequence.len());
    let mut prev_completed_at: Option<DateTime<Utc>> = None;
    let mut unmet_checkpoint: Option<&LessonId> = None;

    for (module, lesson) in &sequence {
        let gate = eligibility::module_gate(module, ctx.user, enrollment);

        let entry = match gate {
            ModuleGate::Blocked(reason) => LessonAccess::unavailable(&lesson.id, Some(reason)),
            ModuleGate::Forced => match unmet_checkpoint {
                Some(checkpoint) => LessonAccess::unavailable(
                    &lesson.id,
                    Some(BlockedReason::CheckpointIncomplete {
                        lesson_id: checkpoint.clone(),
                    }),
                ),
                None => LessonAccess {
                    lesson_id: lesson.id.clone(),
                    is_available: true,
                    available_date: None,
                    is_late: false,
                    blocked: None,
                },
            },
            ModuleGate::Eligible => {
                let schedule = eligibility::effective_schedule(module, lesson, track);
                let verdict = drip::evaluate(&schedule, &anchor, prev_completed_at, ctx.now);

                let blocked = if let Some(checkpoint) = unmet_checkpoint {
                    Some(BlockedReason::CheckpointIncomplete {
                        lesson_id: checkpoint.clone(),
                    })
                } else if verdict.hard_deadline_passed {
                    Some(BlockedReason::HardDeadlinePassed)
                } else if !verdict.is_available {
                    Some(BlockedReason::DripLocked)
                } else {
                    None
                };

                LessonAccess {
                    lesson_id: lesson.id.clone(),
                    is_available: blocked.is_none(),
                    available_date: verdict.available_date,
                    is_late: verdict.is_late,
                    blocked,
                }
            }
        };

        lessons.push(entry);

        let lesson_progress = ctx.progress.get(&lesson.id);
        prev_completed_at = lesson_progress
            .filter(|p| p.is_completed())
            .and_then(|p| p.completed_at);
        if lesson.is_stop_lesson && !lesson_progress.is_some_and(|p| p.is_completed()) {
            unmet_checkpoint = Some(&lesson.id);
        }
    }

    Ok(CourseAvailability {
        course_id: course.id.clone(),
        evaluated_at: ctx.now,
        lessons,
    })
}

/// Evaluate a single lesson. An unknown lesson id fails closed.
pub fn evaluate_lesson(
    course: &Course,
    lesson_id: &str,
    ctx: &AccessContext<'_>,
) -> Result<LessonAccess, EnrollmentError> {
    let availability = evaluate_course(course, ctx)?;
    match availability.get(lesson_id) {
        Some(access) => Ok(access.clone()),
        None => {
            tracing::warn!(lesson_id, course_id = %course.id, "unknown lesson, failing closed");
            Ok(LessonAccess::unavailable(lesson_id, None))
        }
    }
}
