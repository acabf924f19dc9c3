//! The `coursegate validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(course_path: PathBuf) -> Result<()> {
    let courses = if course_path.is_dir() {
        coursegate_core::parser::load_course_directory(&course_path)?
    } else {
        vec![coursegate_core::parser::parse_course(&course_path)?]
    };

    let mut total_warnings = 0;

    for course in &courses {
        let lesson_count = course.sequence().len();
        println!("Course: {} ({lesson_count} lessons)", course.title);

        let warnings = coursegate_core::parser::validate_course(course);
        for w in &warnings {
            let prefix = w
                .lesson_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All courses valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
