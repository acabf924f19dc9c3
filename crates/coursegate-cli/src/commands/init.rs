//! The `coursegate init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    std::fs::create_dir_all("courses")?;
    let course_path = std::path::Path::new("courses/example.toml");
    if course_path.exists() {
        println!("courses/example.toml already exists, skipping.");
    } else {
        std::fs::write(course_path, EXAMPLE_COURSE)?;
        println!("Created courses/example.toml");
    }

    std::fs::create_dir_all("learners")?;
    let learner_path = std::path::Path::new("learners/example.toml");
    if learner_path.exists() {
        println!("learners/example.toml already exists, skipping.");
    } else {
        std::fs::write(learner_path, EXAMPLE_LEARNER)?;
        println!("Created learners/example.toml");
    }

    let answers_path = std::path::Path::new("answers.json");
    if answers_path.exists() {
        println!("answers.json already exists, skipping.");
    } else {
        std::fs::write(answers_path, EXAMPLE_ANSWERS)?;
        println!("Created answers.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: coursegate validate --course courses/example.toml");
    println!(
        "  2. Run: coursegate availability --course courses/example.toml --learner learners/example.toml"
    );

    Ok(())
}

const EXAMPLE_COURSE: &str = r#"[course]
id = "rust-start"
title = "Rust from Scratch"

[[modules]]
id = "basics"
title = "Basics"
order_index = 1

[[modules.lessons]]
id = "intro"
title = "Introduction"
order_index = 1
kind = "video"

[[modules.lessons]]
id = "ownership"
title = "Ownership"
order_index = 2
kind = "text"
is_stop_lesson = true

[[modules.lessons]]
id = "basics-quiz"
title = "Basics Quiz"
order_index = 3
kind = "quiz"

[modules.lessons.quiz]
passing_score = 70
max_attempts = 3
time_limit_secs = 600

[[modules.lessons.quiz.questions]]
type = "single_choice"
id = "q1"
prompt = "Which keyword declares an immutable binding?"
options = ["let", "var", "const fn"]
correct = "let"

[[modules.lessons.quiz.questions]]
type = "multiple_choice"
id = "q2"
prompt = "Which of these are ownership rules?"
options = ["one owner", "values freed on scope end", "garbage collection"]
correct = ["one owner", "values freed on scope end"]

[[modules]]
id = "advanced"
title = "Advanced"
order_index = 2
allowed_tiers = ["pro"]

[modules.schedule]
rule = { type = "after_start", days = 7 }

[modules.track_overrides.fast]
rule = { mode = "replace", value = { type = "after_start", days = 2 } }

[[modules.lessons]]
id = "lifetimes"
title = "Lifetimes"
order_index = 1
kind = "video"
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "q1": "let",
  "q2": ["one owner", "values freed on scope end"]
}
"#;

const EXAMPLE_LEARNER: &str = r#"[user]
id = "learner-1"
tier = "pro"
track = "fast"

[[user.groups]]
group_id = "cohort-2026-01"
start_date = "2026-01-12"

[enrollment]
status = "active"
start_date = "2026-01-15"
"#;
