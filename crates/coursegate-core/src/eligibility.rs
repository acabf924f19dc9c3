//! Eligibility: tier/track/cohort allow-lists and per-track overrides.
//!
//! A learner passes a module's gate only if every *non-empty* allow-list
//! matches them; an empty list restricts nothing. Admins can additionally
//! force a module open or closed per enrollment, which wins over every
//! other check.

use crate::access::BlockedReason;
use crate::model::{DripSchedule, Enrollment, Lesson, Module, User};

/// Result of the allow-list gate for one module.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleGate {
    /// Force-opened by an admin; drip timing is bypassed too.
    Forced,
    /// Eligible; drip timing still applies.
    Eligible,
    /// Blocked, with the reason to report.
    Blocked(BlockedReason),
}

/// Evaluate allow-lists and per-enrollment admin locks for a module.
pub fn module_gate(module: &Module, user: &User, enrollment: &Enrollment) -> ModuleGate {
    if enrollment.forced_modules.iter().any(|m| *m == module.id) {
        return ModuleGate::Forced;
    }
    if enrollment.restricted_modules.iter().any(|m| *m == module.id) {
        return ModuleGate::Blocked(BlockedReason::RestrictedManually);
    }

    if !module.allowed_tiers.is_empty() {
        let matches = user
            .tier
            .as_ref()
            .is_some_and(|t| module.allowed_tiers.contains(t));
        if !matches {
            return ModuleGate::Blocked(BlockedReason::TierMismatch);
        }
    }

    if !module.allowed_tracks.is_empty() {
        let matches = user
            .track
            .as_ref()
            .is_some_and(|t| module.allowed_tracks.contains(t));
        if !matches {
            return ModuleGate::Blocked(BlockedReason::TrackMismatch);
        }
    }

    if !module.allowed_groups.is_empty() {
        let member = user
            .groups
            .iter()
            .any(|g| module.allowed_groups.contains(&g.group_id));
        if !member {
            return ModuleGate::Blocked(BlockedReason::GroupMismatch);
        }
    }

    ModuleGate::Eligible
}

/// Resolve the drip schedule that actually applies to a lesson for a
/// learner: the lesson's own schedule if it has one, otherwise the
/// module's, then the learner's track override field by field.
pub fn effective_schedule(module: &Module, lesson: &Lesson, track: Option<&str>) -> DripSchedule {
    let base = lesson
        .schedule
        .clone()
        .unwrap_or_else(|| module.schedule.clone());

    let Some(entry) = track.and_then(|t| module.track_overrides.get(t)) else {
        return base;
    };

    DripSchedule {
        rule: entry.rule.apply(base.rule),
        soft_deadline: entry.soft_deadline.apply(base.soft_deadline),
        hard_deadline: entry.hard_deadline.apply(base.hard_deadline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DripRule, EnrollmentStatus, GroupMembership, LessonKind, Override, Role, TrackOverride,
    };
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn user(tier: Option<&str>, track: Option<&str>, groups: &[&str]) -> User {
        User {
            id: "u1".into(),
            role: Role::Student,
            tier: tier.map(Into::into),
            track: track.map(Into::into),
            groups: groups
                .iter()
                .map(|g| GroupMembership {
                    group_id: g.to_string(),
                    start_date: None,
                })
                .collect(),
        }
    }

    fn enrollment() -> Enrollment {
        Enrollment {
            status: EnrollmentStatus::Active,
            start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            expires_at: None,
            forced_modules: vec![],
            restricted_modules: vec![],
        }
    }

    fn module() -> Module {
        Module {
            id: "m1".into(),
            title: "M1".into(),
            order_index: 1,
            allowed_tiers: vec![],
            allowed_tracks: vec![],
            allowed_groups: vec![],
            schedule: DripSchedule::default(),
            track_overrides: HashMap::new(),
            lessons: vec![],
        }
    }

    fn lesson() -> Lesson {
        Lesson {
            id: "l1".into(),
            title: "L1".into(),
            order_index: 1,
            kind: LessonKind::Text,
            is_stop_lesson: false,
            schedule: None,
            quiz: None,
        }
    }

    #[test]
    fn empty_allow_lists_restrict_nothing() {
        let gate = module_gate(&module(), &user(None, None, &[]), &enrollment());
        assert_eq!(gate, ModuleGate::Eligible);
    }

    #[test]
    fn tier_allow_list_enforced() {
        let mut m = module();
        m.allowed_tiers = vec!["pro".into(), "vip".into()];

        assert_eq!(
            module_gate(&m, &user(Some("pro"), None, &[]), &enrollment()),
            ModuleGate::Eligible
        );
        assert_eq!(
            module_gate(&m, &user(Some("basic"), None, &[]), &enrollment()),
            ModuleGate::Blocked(BlockedReason::TierMismatch)
        );
        // No tier at all also fails a non-empty list.
        assert_eq!(
            module_gate(&m, &user(None, None, &[]), &enrollment()),
            ModuleGate::Blocked(BlockedReason::TierMismatch)
        );
    }

    #[test]
    fn group_allow_list_is_set_intersection() {
        let mut m = module();
        m.allowed_groups = vec!["g1".into(), "g2".into()];

        assert_eq!(
            module_gate(&m, &user(None, None, &["g3", "g2"]), &enrollment()),
            ModuleGate::Eligible
        );
        assert_eq!(
            module_gate(&m, &user(None, None, &["g3"]), &enrollment()),
            ModuleGate::Blocked(BlockedReason::GroupMismatch)
        );
    }

    #[test]
    fn all_dimensions_must_match() {
        let mut m = module();
        m.allowed_tiers = vec!["pro".into()];
        m.allowed_tracks = vec!["fast".into()];

        assert_eq!(
            module_gate(&m, &user(Some("pro"), Some("slow"), &[]), &enrollment()),
            ModuleGate::Blocked(BlockedReason::TrackMismatch)
        );
        assert_eq!(
            module_gate(&m, &user(Some("pro"), Some("fast"), &[]), &enrollment()),
            ModuleGate::Eligible
        );
    }

    #[test]
    fn forced_wins_over_allow_lists() {
        let mut m = module();
        m.allowed_tiers = vec!["vip".into()];
        let mut e = enrollment();
        e.forced_modules = vec!["m1".into()];

        assert_eq!(
            module_gate(&m, &user(None, None, &[]), &e),
            ModuleGate::Forced
        );
    }

    #[test]
    fn restricted_wins_over_eligibility() {
        let m = module();
        let mut e = enrollment();
        e.restricted_modules = vec!["m1".into()];

        assert_eq!(
            module_gate(&m, &user(Some("pro"), None, &[]), &e),
            ModuleGate::Blocked(BlockedReason::RestrictedManually)
        );
    }

    #[test]
    fn lesson_schedule_replaces_module_schedule() {
        let mut m = module();
        m.schedule.rule = Some(DripRule::AfterStart { days: 10 });
        let mut l = lesson();
        l.schedule = Some(DripSchedule {
            rule: Some(DripRule::AfterStart { days: 2 }),
            soft_deadline: None,
            hard_deadline: None,
        });

        let effective = effective_schedule(&m, &l, None);
        assert_eq!(effective.rule, Some(DripRule::AfterStart { days: 2 }));
    }

    #[test]
    fn track_override_replaces_and_clears_fields() {
        let hard = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let mut m = module();
        m.schedule = DripSchedule {
            rule: Some(DripRule::AfterStart { days: 7 }),
            soft_deadline: None,
            hard_deadline: Some(hard),
        };
        m.track_overrides.insert(
            "fast".into(),
            TrackOverride {
                rule: Override::Replace(DripRule::AfterStart { days: 1 }),
                soft_deadline: Override::Inherit,
                hard_deadline: Override::Clear,
            },
        );

        let fast = effective_schedule(&m, &lesson(), Some("fast"));
        assert_eq!(fast.rule, Some(DripRule::AfterStart { days: 1 }));
        assert_eq!(fast.hard_deadline, None);

        // Other tracks keep the defaults.
        let other = effective_schedule(&m, &lesson(), Some("slow"));
        assert_eq!(other.rule, Some(DripRule::AfterStart { days: 7 }));
        assert_eq!(other.hard_deadline, Some(hard));
    }

    #[test]
    fn all_inherit_override_changes_nothing() {
        let mut m = module();
        m.schedule.rule = Some(DripRule::AfterStart { days: 7 });
        m.track_overrides
            .insert("fast".into(), TrackOverride::default());

        let effective = effective_schedule(&m, &lesson(), Some("fast"));
        assert_eq!(effective.rule, Some(DripRule::AfterStart { days: 7 }));
    }
}
