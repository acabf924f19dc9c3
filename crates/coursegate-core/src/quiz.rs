//! Quiz configuration and auto-grading.
//!
//! Question kinds are explicit tagged unions; `text`/`code` questions can
//! never be auto-corrected and always escalate the attempt to human review.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Grading configuration of a quiz lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub questions: Vec<Question>,
    /// Minimum percentage score (0–100) to pass.
    #[serde(default = "default_passing_score")]
    pub passing_score: u8,
    /// Maximum attempts per learner.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wall-clock limit per attempt, in seconds. `None` = unlimited.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
    /// Force every attempt through curator review regardless of content.
    #[serde(default)]
    pub requires_review: bool,
}

fn default_passing_score() -> u8 {
    70
}

fn default_max_attempts() -> u32 {
    3
}

impl QuizConfig {
    /// Sum of all question points.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points()).sum()
    }
}

/// A quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    SingleChoice {
        id: String,
        prompt: String,
        options: Vec<String>,
        correct: String,
        #[serde(default = "default_points")]
        points: u32,
    },
    MultipleChoice {
        id: String,
        prompt: String,
        options: Vec<String>,
        correct: Vec<String>,
        #[serde(default = "default_points")]
        points: u32,
    },
    Text {
        id: String,
        prompt: String,
        #[serde(default = "default_points")]
        points: u32,
    },
    Code {
        id: String,
        prompt: String,
        #[serde(default = "default_points")]
        points: u32,
    },
}

fn default_points() -> u32 {
    1
}

impl Question {
    pub fn id(&self) -> &str {
        match self {
            Question::SingleChoice { id, .. }
            | Question::MultipleChoice { id, .. }
            | Question::Text { id, .. }
            | Question::Code { id, .. } => id,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            Question::SingleChoice { points, .. }
            | Question::MultipleChoice { points, .. }
            | Question::Text { points, .. }
            | Question::Code { points, .. } => *points,
        }
    }

    /// True for question kinds that cannot be auto-corrected.
    pub fn needs_review(&self) -> bool {
        matches!(self, Question::Text { .. } | Question::Code { .. })
    }
}

/// A learner's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Several selected options (multiple choice).
    Many(Vec<String>),
    /// A single selected option or free text.
    One(String),
}

/// Answers keyed by question id.
pub type AnswerMap = HashMap<String, Answer>;

/// Outcome of auto-grading one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub is_correct: bool,
    pub awarded_points: u32,
    pub requires_review: bool,
}

/// Outcome of auto-grading a whole attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeBreakdown {
    /// Percentage score, 0–100.
    pub score: u8,
    pub earned_points: u32,
    pub total_points: u32,
    /// Set when any question needs human judgment.
    pub requires_review: bool,
    pub questions: Vec<QuestionResult>,
}

/// Auto-grade a set of answers against the configured questions.
///
/// Multiple choice requires exact set equality with the configured correct
/// options. Unanswered questions score zero. Score is
/// `round(100 * earned / total)`, or 0 when total points is 0.
pub fn grade(questions: &[Question], answers: &AnswerMap) -> GradeBreakdown {
    let total_points: u32 = questions.iter().map(|q| q.points()).sum();
    let mut earned_points = 0u32;
    let mut requires_review = false;
    let mut results = Vec::with_capacity(questions.len());

    for question in questions {
        let answer = answers.get(question.id());
        let question_review = question.needs_review();
        let mut is_correct = false;

        match question {
            Question::SingleChoice { correct, .. } => {
                is_correct = matches!(answer, Some(Answer::One(a)) if a == correct);
            }
            Question::MultipleChoice { correct, .. } => {
                let given: Vec<&str> = match answer {
                    Some(Answer::Many(items)) => items.iter().map(String::as_str).collect(),
                    Some(Answer::One(item)) => vec![item.as_str()],
                    None => vec![],
                };
                is_correct = given.len() == correct.len()
                    && correct.iter().all(|c| given.contains(&c.as_str()));
            }
            Question::Text { .. } | Question::Code { .. } => {
                requires_review = true;
            }
        }

        let awarded = if is_correct && !question_review {
            question.points()
        } else {
            0
        };
        earned_points += awarded;

        results.push(QuestionResult {
            question_id: question.id().to_string(),
            is_correct,
            awarded_points: awarded,
            requires_review: question_review,
        });
    }

    let score = if total_points == 0 {
        0
    } else {
        ((earned_points as f64 / total_points as f64) * 100.0).round() as u8
    };

    GradeBreakdown {
        score,
        earned_points,
        total_points,
        requires_review,
        questions: results,
    }
}
