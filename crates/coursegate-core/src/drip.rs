//! Drip scheduling: computes the earliest instant a lesson opens.
//!
//! Pure functions of `(schedule, anchors, now)` — for fixed inputs the
//! verdict is always the same, which keeps the whole availability layer
//! deterministic under test. Anything the scheduler cannot compute fails
//! closed: the lesson is reported unavailable, never open by default.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::model::{DripRule, DripSchedule, Enrollment, User};

/// Anchor dates a relative drip rule counts from.
#[derive(Debug, Clone, Copy)]
pub struct DripAnchor {
    /// The learner's enrollment start.
    pub enrollment_start: DateTime<Utc>,
    /// Earliest cohort start among the learner's groups, when present.
    /// Preferred over the enrollment start (cohort-driven drip).
    pub group_start: Option<DateTime<Utc>>,
}

impl DripAnchor {
    /// Resolve the anchor for a learner and enrollment.
    pub fn resolve(user: &User, enrollment: &Enrollment) -> Self {
        Self {
            enrollment_start: enrollment.start_date,
            group_start: user.earliest_group_start(),
        }
    }

    /// The effective anchor date.
    pub fn date(&self) -> DateTime<Utc> {
        self.group_start.unwrap_or(self.enrollment_start)
    }
}

/// The scheduler's verdict for one lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct DripVerdict {
    pub is_available: bool,
    /// Earliest opening instant; `None` when no anchor is computable yet
    /// (e.g. relative-to-previous with no prior completion).
    pub available_date: Option<DateTime<Utc>>,
    /// The soft deadline has passed; submissions are accepted but late.
    pub is_late: bool,
    /// The hard deadline has passed; the lesson is closed.
    pub hard_deadline_passed: bool,
}

impl DripVerdict {
    fn open(available_date: Option<DateTime<Utc>>, is_late: bool) -> Self {
        Self {
            is_available: true,
            available_date,
            is_late,
            hard_deadline_passed: false,
        }
    }

    fn locked(available_date: Option<DateTime<Utc>>) -> Self {
        Self {
            is_available: false,
            available_date,
            is_late: false,
            hard_deadline_passed: false,
        }
    }
}

/// Truncate to midnight UTC. Day-granular rules compare whole days, so a
/// learner who enrolled at 23:50 is not penalised by the time of day.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_hour(0)
        .and_then(|d| d.with_minute(0))
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(instant)
}

/// Evaluate a drip schedule at `now`.
///
/// `previous_completed_at` is the completion instant of the immediately
/// preceding lesson in sequence, if any; it only matters for
/// `after_previous_completed` rules.
pub fn evaluate(
    schedule: &DripSchedule,
    anchor: &DripAnchor,
    previous_completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DripVerdict {
    if let Some(hard) = schedule.hard_deadline {
        if now > start_of_day(hard) {
            return DripVerdict {
                is_available: false,
                available_date: None,
                is_late: false,
                hard_deadline_passed: true,
            };
        }
    }

    let is_late = schedule
        .soft_deadline
        .is_some_and(|soft| now > start_of_day(soft));

    let available_date = match &schedule.rule {
        None => return DripVerdict::open(None, is_late),
        Some(DripRule::AfterStart { days }) => {
            Some(start_of_day(anchor.date()) + Duration::days(i64::from(*days)))
        }
        Some(DripRule::OnDate { date }) => Some(start_of_day(*date)),
        Some(DripRule::AfterPreviousCompleted { delay_hours }) => match previous_completed_at {
            Some(completed) => Some(completed + Duration::hours(i64::from(*delay_hours))),
            None => {
                tracing::debug!("relative drip rule with no prior completion, failing closed");
                return DripVerdict::locked(None);
            }
        },
    };

    match available_date {
        Some(date) if now >= date => DripVerdict::open(Some(date), is_late),
        other => DripVerdict::locked(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn anchor(start: DateTime<Utc>) -> DripAnchor {
        DripAnchor {
            enrollment_start: start,
            group_start: None,
        }
    }

    fn schedule(rule: DripRule) -> DripSchedule {
        DripSchedule {
            rule: Some(rule),
            soft_deadline: None,
            hard_deadline: None,
        }
    }

    #[test]
    fn after_start_opens_on_day_boundary() {
        // Enrolled day 0 (mid-afternoon), 3-day offset: closed on day 2,
        // open from midnight of day 3.
        let sched = schedule(DripRule::AfterStart { days: 3 });
        let a = anchor(at(2026, 6, 1, 15));

        let day2 = evaluate(&sched, &a, None, at(2026, 6, 3, 23));
        assert!(!day2.is_available);
        assert_eq!(day2.available_date, Some(at(2026, 6, 4, 0)));

        let day3 = evaluate(&sched, &a, None, at(2026, 6, 4, 0));
        assert!(day3.is_available);
    }

    #[test]
    fn group_start_preferred_over_enrollment() {
        let sched = schedule(DripRule::AfterStart { days: 1 });
        let a = DripAnchor {
            enrollment_start: at(2026, 6, 10, 0),
            group_start: Some(at(2026, 6, 1, 0)),
        };

        let verdict = evaluate(&sched, &a, None, at(2026, 6, 3, 0));
        assert!(verdict.is_available);
        assert_eq!(verdict.available_date, Some(at(2026, 6, 2, 0)));
    }

    #[test]
    fn on_date_rule() {
        let sched = schedule(DripRule::OnDate {
            date: at(2026, 7, 1, 18),
        });
        let a = anchor(at(2026, 1, 1, 0));

        assert!(!evaluate(&sched, &a, None, at(2026, 6, 30, 23)).is_available);
        // Opens at midnight of the named day, not at its stored time.
        assert!(evaluate(&sched, &a, None, at(2026, 7, 1, 0)).is_available);
    }

    #[test]
    fn relative_rule_without_prior_completion_fails_closed() {
        let sched = schedule(DripRule::AfterPreviousCompleted { delay_hours: 2 });
        let a = anchor(at(2026, 1, 1, 0));

        let verdict = evaluate(&sched, &a, None, at(2026, 6, 1, 0));
        assert!(!verdict.is_available);
        assert_eq!(verdict.available_date, None);
    }

    #[test]
    fn relative_rule_counts_from_completion() {
        let sched = schedule(DripRule::AfterPreviousCompleted { delay_hours: 2 });
        let a = anchor(at(2026, 1, 1, 0));
        let completed = at(2026, 6, 1, 10);

        let before = evaluate(&sched, &a, Some(completed), at(2026, 6, 1, 11));
        assert!(!before.is_available);
        assert_eq!(before.available_date, Some(at(2026, 6, 1, 12)));

        let after = evaluate(&sched, &a, Some(completed), at(2026, 6, 1, 12));
        assert!(after.is_available);
    }

    #[test]
    fn no_rule_is_immediately_available() {
        let verdict = evaluate(
            &DripSchedule::default(),
            &anchor(at(2026, 1, 1, 0)),
            None,
            at(2026, 1, 1, 0),
        );
        assert!(verdict.is_available);
        assert!(!verdict.is_late);
    }

    #[test]
    fn hard_deadline_closes_even_open_content() {
        let sched = DripSchedule {
            rule: None,
            soft_deadline: None,
            hard_deadline: Some(at(2026, 6, 1, 12)),
        };
        let a = anchor(at(2026, 1, 1, 0));

        assert!(evaluate(&sched, &a, None, at(2026, 6, 1, 0)).is_available);

        let closed = evaluate(&sched, &a, None, at(2026, 6, 2, 0));
        assert!(!closed.is_available);
        assert!(closed.hard_deadline_passed);
    }

    #[test]
    fn soft_deadline_marks_late() {
        let sched = DripSchedule {
            rule: None,
            soft_deadline: Some(at(2026, 6, 1, 0)),
            hard_deadline: None,
        };
        let a = anchor(at(2026, 1, 1, 0));

        let verdict = evaluate(&sched, &a, None, at(2026, 6, 5, 0));
        assert!(verdict.is_available);
        assert!(verdict.is_late);
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let sched = schedule(DripRule::AfterStart { days: 7 });
        let a = anchor(at(2026, 3, 1, 9));
        let now = at(2026, 3, 5, 12);

        let first = evaluate(&sched, &a, None, now);
        for _ in 0..10 {
            assert_eq!(evaluate(&sched, &a, None, now), first);
        }
    }
}
