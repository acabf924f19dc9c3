//! Core data model types for coursegate.
//!
//! These are the fundamental types the whole system uses to represent
//! learners, enrollments, the ordered course content tree, and the drip
//! rules that gate it. Legacy systems carried drip rules and per-track
//! overrides as untyped JSON blobs; here every rule kind is an explicit
//! tagged union validated at the authoring boundary.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::QuizConfig;

/// Learner/user identifier.
pub type UserId = String;
/// Course identifier.
pub type CourseId = String;
/// Module identifier.
pub type ModuleId = String;
/// Lesson identifier.
pub type LessonId = String;
/// Cohort (group) identifier.
pub type GroupId = String;

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Curator,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

/// Membership of a learner in a cohort, with the cohort's start date
/// (used as an alternate drip anchor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: GroupId,
    /// Cohort start date; cohorts without one fall back to the
    /// learner's enrollment start for drip purposes.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

/// A verified learner identity as supplied by the auth collaborator.
///
/// Immutable during an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub role: Role,
    /// Subscription tier, if any.
    #[serde(default)]
    pub tier: Option<String>,
    /// Learning track, if any.
    #[serde(default)]
    pub track: Option<String>,
    /// Cohort memberships.
    #[serde(default)]
    pub groups: Vec<GroupMembership>,
}

impl User {
    /// Earliest start date among the user's cohorts, if any cohort has one.
    pub fn earliest_group_start(&self) -> Option<DateTime<Utc>> {
        self.groups.iter().filter_map(|g| g.start_date).min()
    }
}

/// Status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Paused,
    Cancelled,
    Completed,
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatus::Active => write!(f, "active"),
            EnrollmentStatus::Paused => write!(f, "paused"),
            EnrollmentStatus::Cancelled => write!(f, "cancelled"),
            EnrollmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(EnrollmentStatus::Active),
            "paused" => Ok(EnrollmentStatus::Paused),
            "cancelled" | "canceled" => Ok(EnrollmentStatus::Cancelled),
            "completed" => Ok(EnrollmentStatus::Completed),
            other => Err(format!("unknown enrollment status: {other}")),
        }
    }
}

/// An enrollment of a user into a course. One per (user, course).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub status: EnrollmentStatus,
    /// Anchor for relative drip rules.
    pub start_date: DateTime<Utc>,
    /// Access cut-off; evaluation is refused past this instant.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Module ids force-opened by an admin for this enrollment.
    #[serde(default)]
    pub forced_modules: Vec<ModuleId>,
    /// Module ids manually closed by an admin for this enrollment.
    #[serde(default)]
    pub restricted_modules: Vec<ModuleId>,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now > e)
    }
}

/// A course: an ordered tree of modules containing lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Course {
    /// All lessons flattened in (module order, lesson order) sequence.
    pub fn sequence(&self) -> Vec<(&Module, &Lesson)> {
        let mut modules: Vec<&Module> = self.modules.iter().collect();
        modules.sort_by_key(|m| m.order_index);

        let mut out = Vec::new();
        for module in modules {
            let mut lessons: Vec<&Lesson> = module.lessons.iter().collect();
            lessons.sort_by_key(|l| l.order_index);
            out.extend(lessons.into_iter().map(|l| (module, l)));
        }
        out
    }

    /// Find a lesson and its containing module by lesson id.
    pub fn find_lesson(&self, lesson_id: &str) -> Option<(&Module, &Lesson)> {
        self.modules.iter().find_map(|m| {
            m.lessons
                .iter()
                .find(|l| l.id == lesson_id)
                .map(|l| (m, l))
        })
    }

    /// Ids of all lessons in sequence order.
    pub fn lesson_ids(&self) -> Vec<LessonId> {
        self.sequence().iter().map(|(_, l)| l.id.clone()).collect()
    }
}

/// A module: an ordered group of lessons carrying access allow-lists,
/// a drip schedule, and optional per-track overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub order_index: u32,
    /// Subscription tiers allowed in. Empty = unrestricted.
    #[serde(default)]
    pub allowed_tiers: Vec<String>,
    /// Learning tracks allowed in. Empty = unrestricted.
    #[serde(default)]
    pub allowed_tracks: Vec<String>,
    /// Cohorts allowed in. Empty = unrestricted.
    #[serde(default)]
    pub allowed_groups: Vec<GroupId>,
    /// Default drip schedule for lessons in this module.
    #[serde(default)]
    pub schedule: DripSchedule,
    /// Per-track schedule overrides, keyed by track id.
    #[serde(default)]
    pub track_overrides: HashMap<String, TrackOverride>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Kind of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Video,
    Text,
    Quiz,
}

impl Default for LessonKind {
    fn default() -> Self {
        LessonKind::Text
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonKind::Video => write!(f, "video"),
            LessonKind::Text => write!(f, "text"),
            LessonKind::Quiz => write!(f, "quiz"),
        }
    }
}

impl FromStr for LessonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(LessonKind::Video),
            "text" => Ok(LessonKind::Text),
            "quiz" => Ok(LessonKind::Quiz),
            other => Err(format!("unknown lesson kind: {other}")),
        }
    }
}

/// A leaf content node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub order_index: u32,
    #[serde(default)]
    pub kind: LessonKind,
    /// Checkpoint flag: everything after this lesson stays locked until
    /// it is completed.
    #[serde(default)]
    pub is_stop_lesson: bool,
    /// Lesson-level schedule; when present it replaces the module schedule
    /// for this lesson.
    #[serde(default)]
    pub schedule: Option<DripSchedule>,
    /// Grading configuration; present iff `kind` is `Quiz`.
    #[serde(default)]
    pub quiz: Option<QuizConfig>,
}

impl Lesson {
    pub fn is_quiz(&self) -> bool {
        self.kind == LessonKind::Quiz
    }
}

/// Drip gating for a content node: an unlock rule plus optional deadlines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DripSchedule {
    /// Unlock rule; `None` means available immediately.
    #[serde(default)]
    pub rule: Option<DripRule>,
    /// Past this date submissions are marked late but still allowed.
    #[serde(default)]
    pub soft_deadline: Option<DateTime<Utc>>,
    /// Past this date the content closes entirely.
    #[serde(default)]
    pub hard_deadline: Option<DateTime<Utc>>,
}

impl DripSchedule {
    /// True when the schedule gates nothing.
    pub fn is_unrestricted(&self) -> bool {
        self.rule.is_none() && self.soft_deadline.is_none() && self.hard_deadline.is_none()
    }
}

/// When a piece of content unlocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DripRule {
    /// A whole-day offset from the drip anchor (cohort start date if the
    /// learner has one, otherwise enrollment start date).
    AfterStart { days: u32 },
    /// An absolute calendar date.
    OnDate { date: DateTime<Utc> },
    /// Unlocks a number of hours after the immediately preceding lesson
    /// was completed; unavailable until that completion exists.
    AfterPreviousCompleted {
        #[serde(default)]
        delay_hours: u32,
    },
}

/// Per-field override state used in track overrides.
///
/// `Inherit` keeps the node's default, `Clear` removes the gate for this
/// track, `Replace` substitutes a new value. An override entry whose fields
/// are all `Inherit` is exactly "no override".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Override<T> {
    Inherit,
    Clear,
    Replace(T),
}

// Not derived: the derive would demand `T: Default`, which rule types
// do not have.
impl<T> Default for Override<T> {
    fn default() -> Self {
        Override::Inherit
    }
}

impl<T: Clone> Override<T> {
    /// Resolve against the inherited value.
    pub fn apply(&self, inherited: Option<T>) -> Option<T> {
        match self {
            Override::Inherit => inherited,
            Override::Clear => None,
            Override::Replace(value) => Some(value.clone()),
        }
    }
}

/// Track-specific replacement of a node's drip fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackOverride {
    #[serde(default)]
    pub rule: Override<DripRule>,
    #[serde(default)]
    pub soft_deadline: Override<DateTime<Utc>>,
    #[serde(default)]
    pub hard_deadline: Override<DateTime<Utc>>,
}

impl TrackOverride {
    /// True when every field inherits, i.e. the entry changes nothing.
    pub fn is_noop(&self) -> bool {
        self.rule == Override::Inherit
            && self.soft_deadline == Override::Inherit
            && self.hard_deadline == Override::Inherit
    }
}
