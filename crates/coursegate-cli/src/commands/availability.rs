//! The `coursegate availability` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};

use coursegate_core::access::{evaluate_course, AccessContext};
use coursegate_core::parser;
use coursegate_core::progress::ProgressMap;

pub fn execute(
    course_path: PathBuf,
    learner_path: PathBuf,
    progress_path: Option<PathBuf>,
    at: Option<String>,
    format: String,
) -> Result<()> {
    let course = parser::parse_course(&course_path)?;
    let learner = parser::parse_learner(&learner_path)?;
    let progress = load_progress(progress_path.as_deref())?;
    let now = match at {
        Some(s) => parser::parse_date(&s)?,
        None => Utc::now(),
    };

    let ctx = AccessContext {
        user: &learner.user,
        enrollment: Some(&learner.enrollment),
        progress: &progress,
        now,
    };
    let availability = evaluate_course(&course, &ctx)
        .with_context(|| format!("cannot evaluate course {}", course.id))?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&availability)?);
        }
        "table" => {
            println!(
                "Course: {} — learner {} at {}",
                course.title, learner.user.id, now
            );

            let mut table = Table::new();
            table.set_header(vec!["Lesson", "Available", "Opens", "Late", "Blocked"]);
            for access in &availability.lessons {
                table.add_row(vec![
                    Cell::new(&access.lesson_id),
                    Cell::new(if access.is_available { "yes" } else { "no" }),
                    Cell::new(
                        access
                            .available_date
                            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default(),
                    ),
                    Cell::new(if access.is_late { "late" } else { "" }),
                    Cell::new(
                        access
                            .blocked
                            .as_ref()
                            .map(|b| b.to_string())
                            .unwrap_or_default(),
                    ),
                ]);
            }
            println!("{table}");

            let summary = availability.summary(&progress);
            println!(
                "{} lessons: {} available, {} locked, {} completed",
                summary.total, summary.available, summary.locked, summary.completed
            );
        }
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn load_progress(path: Option<&std::path::Path>) -> Result<ProgressMap> {
    let Some(path) = path else {
        return Ok(ProgressMap::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read progress file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse progress JSON: {}", path.display()))
}
