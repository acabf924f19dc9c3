//! TOML course and learner parser.
//!
//! Loads courses from TOML files and directories, and validates them.
//! Dates are authored as strings, either RFC 3339 or `YYYY-MM-DD`
//! (interpreted as midnight UTC).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::model::{
    Course, DripRule, DripSchedule, Enrollment, EnrollmentStatus, GroupMembership, Lesson,
    LessonKind, Module, Override, Role, TrackOverride, User,
};
use crate::quiz::QuizConfig;

/// Intermediate TOML structure for parsing course files.
#[derive(Debug, Deserialize)]
struct TomlCourseFile {
    course: TomlCourseHeader,
    #[serde(default)]
    modules: Vec<TomlModule>,
}

#[derive(Debug, Deserialize)]
struct TomlCourseHeader {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct TomlModule {
    id: String,
    title: String,
    order_index: u32,
    #[serde(default)]
    allowed_tiers: Vec<String>,
    #[serde(default)]
    allowed_tracks: Vec<String>,
    #[serde(default)]
    allowed_groups: Vec<String>,
    #[serde(default)]
    schedule: Option<TomlSchedule>,
    #[serde(default)]
    track_overrides: HashMap<String, TomlTrackOverride>,
    #[serde(default)]
    lessons: Vec<TomlLesson>,
}

#[derive(Debug, Deserialize)]
struct TomlLesson {
    id: String,
    title: String,
    order_index: u32,
    #[serde(default = "default_kind_str")]
    kind: String,
    #[serde(default)]
    is_stop_lesson: bool,
    #[serde(default)]
    schedule: Option<TomlSchedule>,
    #[serde(default)]
    quiz: Option<QuizConfig>,
}

fn default_kind_str() -> String {
    "text".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlSchedule {
    #[serde(default)]
    rule: Option<TomlDripRule>,
    #[serde(default)]
    soft_deadline: Option<String>,
    #[serde(default)]
    hard_deadline: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TomlDripRule {
    AfterStart {
        days: u32,
    },
    OnDate {
        date: String,
    },
    AfterPreviousCompleted {
        #[serde(default)]
        delay_hours: u32,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
enum TomlRuleOverride {
    #[default]
    Inherit,
    Clear,
    Replace(TomlDripRule),
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
enum TomlDateOverride {
    #[default]
    Inherit,
    Clear,
    Replace(String),
}

#[derive(Debug, Default, Deserialize)]
struct TomlTrackOverride {
    #[serde(default)]
    rule: TomlRuleOverride,
    #[serde(default)]
    soft_deadline: TomlDateOverride,
    #[serde(default)]
    hard_deadline: TomlDateOverride,
}

/// Intermediate TOML structure for learner files.
#[derive(Debug, Deserialize)]
struct TomlLearnerFile {
    user: TomlUser,
    enrollment: TomlEnrollment,
}

#[derive(Debug, Deserialize)]
struct TomlUser {
    id: String,
    #[serde(default = "default_role_str")]
    role: String,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    track: Option<String>,
    #[serde(default)]
    groups: Vec<TomlGroup>,
}

fn default_role_str() -> String {
    "student".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlGroup {
    group_id: String,
    #[serde(default)]
    start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlEnrollment {
    #[serde(default = "default_status_str")]
    status: String,
    start_date: String,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    forced_modules: Vec<String>,
    #[serde(default)]
    restricted_modules: Vec<String>,
}

fn default_status_str() -> String {
    "active".to_string()
}

/// A learner as authored in a TOML file: identity plus enrollment.
#[derive(Debug, Clone)]
pub struct Learner {
    pub user: User,
    pub enrollment: Enrollment,
}

/// Parse a date string, accepting RFC 3339 or plain `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid date: {input}"))?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc())
}

fn parse_opt_date(input: Option<String>) -> Result<Option<DateTime<Utc>>> {
    input.map(|s| parse_date(&s)).transpose()
}

fn convert_rule(rule: TomlDripRule) -> Result<DripRule> {
    Ok(match rule {
        TomlDripRule::AfterStart { days } => DripRule::AfterStart { days },
        TomlDripRule::OnDate { date } => DripRule::OnDate {
            date: parse_date(&date)?,
        },
        TomlDripRule::AfterPreviousCompleted { delay_hours } => {
            DripRule::AfterPreviousCompleted { delay_hours }
        }
    })
}

fn convert_schedule(schedule: Option<TomlSchedule>) -> Result<DripSchedule> {
    let Some(s) = schedule else {
        return Ok(DripSchedule::default());
    };
    Ok(DripSchedule {
        rule: s.rule.map(convert_rule).transpose()?,
        soft_deadline: parse_opt_date(s.soft_deadline)?,
        hard_deadline: parse_opt_date(s.hard_deadline)?,
    })
}

fn convert_track_override(entry: TomlTrackOverride) -> Result<TrackOverride> {
    let rule = match entry.rule {
        TomlRuleOverride::Inherit => Override::Inherit,
        TomlRuleOverride::Clear => Override::Clear,
        TomlRuleOverride::Replace(r) => Override::Replace(convert_rule(r)?),
    };
    let date = |o: TomlDateOverride| -> Result<Override<DateTime<Utc>>> {
        Ok(match o {
            TomlDateOverride::Inherit => Override::Inherit,
            TomlDateOverride::Clear => Override::Clear,
            TomlDateOverride::Replace(s) => Override::Replace(parse_date(&s)?),
        })
    };
    Ok(TrackOverride {
        rule,
        soft_deadline: date(entry.soft_deadline)?,
        hard_deadline: date(entry.hard_deadline)?,
    })
}

/// Parse a single TOML file into a `Course`.
pub fn parse_course(path: &Path) -> Result<Course> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read course file: {}", path.display()))?;

    parse_course_str(&content, path)
}

/// Parse a TOML string into a `Course` (useful for testing).
pub fn parse_course_str(content: &str, source_path: &Path) -> Result<Course> {
    let parsed: TomlCourseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let modules = parsed
        .modules
        .into_iter()
        .map(|m| {
            let lessons = m
                .lessons
                .into_iter()
                .map(|l| {
                    let kind: LessonKind = l
                        .kind
                        .parse()
                        .map_err(|e: String| anyhow::anyhow!("lesson {}: {}", l.id, e))?;
                    let schedule = l.schedule.map(Some).map(convert_schedule).transpose()?;

                    Ok(Lesson {
                        id: l.id,
                        title: l.title,
                        order_index: l.order_index,
                        kind,
                        is_stop_lesson: l.is_stop_lesson,
                        schedule,
                        quiz: l.quiz,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let track_overrides = m
                .track_overrides
                .into_iter()
                .map(|(track, entry)| Ok((track, convert_track_override(entry)?)))
                .collect::<Result<HashMap<_, _>>>()?;

            Ok(Module {
                id: m.id,
                title: m.title,
                order_index: m.order_index,
                allowed_tiers: m.allowed_tiers,
                allowed_tracks: m.allowed_tracks,
                allowed_groups: m.allowed_groups,
                schedule: convert_schedule(m.schedule)?,
                track_overrides,
                lessons,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Course {
        id: parsed.course.id,
        title: parsed.course.title,
        modules,
    })
}

/// Parse a single TOML file into a `Learner`.
pub fn parse_learner(path: &Path) -> Result<Learner> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read learner file: {}", path.display()))?;

    parse_learner_str(&content, path)
}

/// Parse a TOML string into a `Learner` (useful for testing).
pub fn parse_learner_str(content: &str, source_path: &Path) -> Result<Learner> {
    let parsed: TomlLearnerFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let role: Role = match parsed.user.role.as_str() {
        "student" => Role::Student,
        "curator" => Role::Curator,
        "admin" => Role::Admin,
        other => anyhow::bail!("unknown role: {other}"),
    };

    let groups = parsed
        .user
        .groups
        .into_iter()
        .map(|g| {
            Ok(GroupMembership {
                group_id: g.group_id,
                start_date: parse_opt_date(g.start_date)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let status: EnrollmentStatus = parsed
        .enrollment
        .status
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    Ok(Learner {
        user: User {
            id: parsed.user.id,
            role,
            tier: parsed.user.tier,
            track: parsed.user.track,
            groups,
        },
        enrollment: Enrollment {
            status,
            start_date: parse_date(&parsed.enrollment.start_date)?,
            expires_at: parse_opt_date(parsed.enrollment.expires_at)?,
            forced_modules: parsed.enrollment.forced_modules,
            restricted_modules: parsed.enrollment.restricted_modules,
        },
    })
}

/// Recursively load all `.toml` course files from a directory.
pub fn load_course_directory(dir: &Path) -> Result<Vec<Course>> {
    let mut courses = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            courses.extend(load_course_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_course(&path) {
                Ok(course) => courses.push(course),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(courses)
}

/// A warning from course validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The lesson ID (if applicable).
    pub lesson_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a course for common authoring issues.
pub fn validate_course(course: &Course) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate module and lesson IDs
    let mut seen_modules = std::collections::HashSet::new();
    for module in &course.modules {
        if !seen_modules.insert(&module.id) {
            warnings.push(ValidationWarning {
                lesson_id: None,
                message: format!("duplicate module ID: {}", module.id),
            });
        }
    }
    let mut seen_lessons = std::collections::HashSet::new();
    for (_, lesson) in course.sequence() {
        if !seen_lessons.insert(&lesson.id) {
            warnings.push(ValidationWarning {
                lesson_id: Some(lesson.id.clone()),
                message: format!("duplicate lesson ID: {}", lesson.id),
            });
        }
    }

    let mut seen_module_orders = std::collections::HashSet::new();
    for module in &course.modules {
        if !seen_module_orders.insert(module.order_index) {
            warnings.push(ValidationWarning {
                lesson_id: None,
                message: format!(
                    "module {}: duplicate order_index {}",
                    module.id, module.order_index
                ),
            });
        }
        let mut seen_lesson_orders = std::collections::HashSet::new();
        for lesson in &module.lessons {
            if !seen_lesson_orders.insert(lesson.order_index) {
                warnings.push(ValidationWarning {
                    lesson_id: Some(lesson.id.clone()),
                    message: format!(
                        "duplicate order_index {} in module {}",
                        lesson.order_index, module.id
                    ),
                });
            }
        }

        // A track override with every field inheriting changes nothing
        for (track, entry) in &module.track_overrides {
            if entry.is_noop() {
                warnings.push(ValidationWarning {
                    lesson_id: None,
                    message: format!(
                        "module {}: track override for '{track}' has no effect",
                        module.id
                    ),
                });
            }
            if !module.allowed_tracks.is_empty() && !module.allowed_tracks.contains(track) {
                warnings.push(ValidationWarning {
                    lesson_id: None,
                    message: format!(
                        "module {}: track override for '{track}', which the module's allow-list excludes",
                        module.id
                    ),
                });
            }
        }

        if let (Some(soft), Some(hard)) =
            (module.schedule.soft_deadline, module.schedule.hard_deadline)
        {
            if hard < soft {
                warnings.push(ValidationWarning {
                    lesson_id: None,
                    message: format!(
                        "module {}: hard deadline is before soft deadline",
                        module.id
                    ),
                });
            }
        }

        for lesson in &module.lessons {
            match (&lesson.quiz, lesson.is_quiz()) {
                (Some(_), false) => warnings.push(ValidationWarning {
                    lesson_id: Some(lesson.id.clone()),
                    message: format!("quiz config on non-quiz lesson (kind: {})", lesson.kind),
                }),
                (None, true) => warnings.push(ValidationWarning {
                    lesson_id: Some(lesson.id.clone()),
                    message: "quiz lesson has no quiz config".into(),
                }),
                _ => {}
            }

            if let Some(quiz) = &lesson.quiz {
                warnings.extend(
                    validate_quiz(quiz)
                        .into_iter()
                        .map(|message| ValidationWarning {
                            lesson_id: Some(lesson.id.clone()),
                            message,
                        }),
                );
            }
        }
    }

    // AfterPreviousCompleted on the very first lesson can never unlock
    if let Some((_, first)) = course.sequence().first() {
        let rule = first
            .schedule
            .as_ref()
            .map(|s| s.rule.as_ref())
            .unwrap_or_else(|| {
                course
                    .modules
                    .iter()
                    .find(|m| m.lessons.iter().any(|l| l.id == first.id))
                    .and_then(|m| m.schedule.rule.as_ref())
            });
        if matches!(rule, Some(DripRule::AfterPreviousCompleted { .. })) {
            warnings.push(ValidationWarning {
                lesson_id: Some(first.id.clone()),
                message: "first lesson depends on a previous lesson that does not exist".into(),
            });
        }
    }

    warnings
}

fn validate_quiz(quiz: &QuizConfig) -> Vec<String> {
    let mut messages = Vec::new();

    if quiz.questions.is_empty() {
        messages.push("quiz has no questions".into());
    }
    if quiz.passing_score > 100 {
        messages.push(format!(
            "passing_score {} is above 100",
            quiz.passing_score
        ));
    }
    if quiz.max_attempts == 0 {
        messages.push("max_attempts is 0; the quiz can never be taken".into());
    }

    let mut seen = std::collections::HashSet::new();
    for question in &quiz.questions {
        if !seen.insert(question.id()) {
            messages.push(format!("duplicate question ID: {}", question.id()));
        }
    }

    for question in &quiz.questions {
        if let crate::quiz::Question::SingleChoice {
            id,
            options,
            correct,
            ..
        } = question
        {
            if !options.contains(correct) {
                messages.push(format!(
                    "question {id}: correct answer '{correct}' is not among the options"
                ));
            }
        }
        if let crate::quiz::Question::MultipleChoice {
            id,
            options,
            correct,
            ..
        } = question
        {
            if correct.is_empty() {
                messages.push(format!("question {id}: no correct answers configured"));
            }
            for c in correct {
                if !options.contains(c) {
                    messages.push(format!(
                        "question {id}: correct answer '{c}' is not among the options"
                    ));
                }
            }
        }
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    const VALID_COURSE: &str = r#"
[course]
id = "rust-start"
title = "Rust from Scratch"

[[modules]]
id = "m1"
title = "Basics"
order_index = 1
allowed_tiers = ["pro", "vip"]

[modules.schedule]
rule = { type = "after_start", days = 7 }
hard_deadline = "2026-12-01"

[modules.track_overrides.fast]
rule = { mode = "replace", value = { type = "after_start", days = 1 } }
hard_deadline = { mode = "clear" }

[[modules.lessons]]
id = "l1"
title = "Hello"
order_index = 1
kind = "video"
is_stop_lesson = true

[[modules.lessons]]
id = "l2"
title = "Checkpoint"
order_index = 2
kind = "quiz"

[modules.lessons.quiz]
passing_score = 70
max_attempts = 3

[[modules.lessons.quiz.questions]]
type = "single_choice"
id = "q1"
prompt = "What does fn mean?"
options = ["function", "finite"]
correct = "function"
"#;

    const VALID_LEARNER: &str = r#"
[user]
id = "u1"
tier = "pro"
track = "fast"

[[user.groups]]
group_id = "g1"
start_date = "2026-02-01"

[enrollment]
status = "active"
start_date = "2026-01-15T10:30:00Z"
"#;

    #[test]
    fn parse_valid_course() {
        let course = parse_course_str(VALID_COURSE, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(course.id, "rust-start");
        assert_eq!(course.modules.len(), 1);

        let module = &course.modules[0];
        assert_eq!(module.allowed_tiers, vec!["pro", "vip"]);
        assert_eq!(module.schedule.rule, Some(DripRule::AfterStart { days: 7 }));
        assert_eq!(
            module.schedule.hard_deadline,
            Some(Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap())
        );

        let entry = module.track_overrides.get("fast").unwrap();
        assert_eq!(
            entry.rule,
            Override::Replace(DripRule::AfterStart { days: 1 })
        );
        assert_eq!(entry.hard_deadline, Override::Clear);
        assert_eq!(entry.soft_deadline, Override::Inherit);

        assert!(module.lessons[0].is_stop_lesson);
        let quiz = module.lessons[1].quiz.as_ref().unwrap();
        assert_eq!(quiz.passing_score, 70);
        assert_eq!(quiz.questions.len(), 1);
    }

    #[test]
    fn parse_valid_learner() {
        let learner = parse_learner_str(VALID_LEARNER, &PathBuf::from("learner.toml")).unwrap();
        assert_eq!(learner.user.id, "u1");
        assert_eq!(learner.user.tier.as_deref(), Some("pro"));
        assert_eq!(
            learner.user.groups[0].start_date,
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(learner.enrollment.status, EnrollmentStatus::Active);
        assert_eq!(
            learner.enrollment.start_date,
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn parse_dates_both_formats() {
        assert_eq!(
            parse_date("2026-03-05").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2026-03-05T08:15:00Z").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 5, 8, 15, 0).unwrap()
        );
        assert!(parse_date("March 5th").is_err());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[course]
id = "minimal"
title = "Minimal"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[[modules.lessons]]
id = "l1"
title = "L1"
order_index = 1
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let module = &course.modules[0];
        assert!(module.allowed_tiers.is_empty());
        assert!(module.schedule.is_unrestricted());
        assert_eq!(module.lessons[0].kind, LessonKind::Text);
        assert!(!module.lessons[0].is_stop_lesson);
    }

    #[test]
    fn unknown_rule_type_rejected() {
        let toml = r#"
[course]
id = "bad"
title = "Bad"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[modules.schedule]
rule = { type = "when_ready" }
"#;
        assert!(parse_course_str(toml, &PathBuf::from("test.toml")).is_err());
    }

    #[test]
    fn validate_duplicate_lesson_ids() {
        let toml = r#"
[course]
id = "dupes"
title = "Dupes"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[[modules.lessons]]
id = "same"
title = "First"
order_index = 1

[[modules.lessons]]
id = "same"
title = "Second"
order_index = 2
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_course(&course);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_quiz_lesson_without_config() {
        let toml = r#"
[course]
id = "c"
title = "C"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[[modules.lessons]]
id = "l1"
title = "Quiz"
order_index = 1
kind = "quiz"
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_course(&course);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("no quiz config")));
    }

    #[test]
    fn validate_correct_answer_must_be_an_option() {
        let toml = r#"
[course]
id = "c"
title = "C"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[[modules.lessons]]
id = "l1"
title = "Quiz"
order_index = 1
kind = "quiz"

[modules.lessons.quiz]

[[modules.lessons.quiz.questions]]
type = "single_choice"
id = "q1"
prompt = "?"
options = ["a", "b"]
correct = "z"
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_course(&course);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("not among the options")));
    }

    #[test]
    fn validate_first_lesson_relative_rule() {
        let toml = r#"
[course]
id = "c"
title = "C"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[[modules.lessons]]
id = "l1"
title = "L1"
order_index = 1

[modules.lessons.schedule]
rule = { type = "after_previous_completed", delay_hours = 24 }
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_course(&course);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("does not exist")));
    }

    #[test]
    fn validate_override_for_excluded_track() {
        let toml = r#"
[course]
id = "c"
title = "C"

[[modules]]
id = "m1"
title = "M1"
order_index = 1
allowed_tracks = ["slow"]

[modules.track_overrides.fast]
rule = { mode = "clear" }
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_course(&course);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("allow-list excludes")));
    }

    #[test]
    fn validate_duplicate_order_indexes() {
        let toml = r#"
[course]
id = "c"
title = "C"

[[modules]]
id = "m1"
title = "M1"
order_index = 1

[[modules.lessons]]
id = "l1"
title = "L1"
order_index = 1

[[modules.lessons]]
id = "l2"
title = "L2"
order_index = 1
"#;
        let course = parse_course_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_course(&course);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate order_index")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_course_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("course.toml");
        std::fs::write(&file_path, VALID_COURSE).unwrap();

        let courses = load_course_directory(dir.path()).unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, "rust-start");
    }
}
