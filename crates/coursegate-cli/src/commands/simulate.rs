//! The `coursegate simulate` command.
//!
//! Runs one full quiz attempt against an in-memory store: availability
//! gate, start, submit, auto-grade, and prints what happened.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use coursegate_core::access::{evaluate_lesson, AccessContext};
use coursegate_core::engine::{QuizEngine, StartOutcome};
use coursegate_core::parser;
use coursegate_core::progress::ProgressMap;
use coursegate_core::quiz::AnswerMap;
use coursegate_store::MemoryStore;

pub async fn execute(
    course_path: PathBuf,
    learner_path: PathBuf,
    lesson_id: String,
    answers_path: PathBuf,
    at: Option<String>,
    review_score: Option<u8>,
) -> Result<()> {
    let course = parser::parse_course(&course_path)?;
    let learner = parser::parse_learner(&learner_path)?;
    let answers: AnswerMap = {
        let content = std::fs::read_to_string(&answers_path)
            .with_context(|| format!("failed to read answers file: {}", answers_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answers JSON: {}", answers_path.display()))?
    };
    let now = match at {
        Some(s) => parser::parse_date(&s)?,
        None => Utc::now(),
    };

    let (_, lesson) = course
        .find_lesson(&lesson_id)
        .with_context(|| format!("lesson {lesson_id} not found in course {}", course.id))?;

    let progress = ProgressMap::new();
    let ctx = AccessContext {
        user: &learner.user,
        enrollment: Some(&learner.enrollment),
        progress: &progress,
        now,
    };
    let access = evaluate_lesson(&course, &lesson_id, &ctx)?;
    if !access.is_available {
        let reason = access
            .blocked
            .map(|b| b.to_string())
            .unwrap_or_else(|| "unavailable".to_string());
        anyhow::bail!("lesson {lesson_id} is not available: {reason}");
    }
    if access.is_late {
        println!("Note: the soft deadline has passed; this submission counts as late.");
    }

    let engine = QuizEngine::new(Arc::new(MemoryStore::new()));

    let outcome = engine.start(&learner.user.id, lesson, now).await?;
    let attempts_left = lesson
        .quiz
        .as_ref()
        .map_or(0, |q| outcome.attempts_left(q.max_attempts));
    let attempt = match outcome {
        StartOutcome::Started(a) | StartOutcome::Resumed(a) => a,
        StartOutcome::TimeExpired(a) => {
            anyhow::bail!("attempt {} already exceeded its time limit", a.id)
        }
        StartOutcome::MaxAttemptsReached { attempts_used } => {
            anyhow::bail!("no attempts left ({attempts_used} used)")
        }
    };
    println!(
        "Started attempt {} (#{}) for lesson {}; {attempts_left} attempt(s) left after this one",
        attempt.id, attempt.attempt_number, lesson_id
    );

    let submission = engine.submit(lesson, attempt.id, answers, now).await?;
    println!("Score: {}%", submission.score);
    if submission.requires_review {
        println!("Held for curator review; the result is not final.");
        if let Some(score) = review_score {
            let reviewed = engine
                .review(lesson, attempt.id, "curator-sim", score, None, now)
                .await?;
            println!(
                "Reviewed at {}%: {}",
                reviewed.score,
                if reviewed.is_passed { "passed" } else { "failed" }
            );
        }
    } else if submission.is_passed {
        println!("Passed. Lesson marked completed.");
    } else {
        println!("Failed. Retry if attempts remain.");
    }

    Ok(())
}
