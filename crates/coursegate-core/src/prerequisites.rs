//! Checkpoint (stop lesson) gating.
//!
//! A stop lesson blocks everything after it in the flattened course
//! sequence until the learner has completed it. This check is independent
//! of drip timing; both must pass for a lesson to be available.

use crate::model::{Lesson, Module};
use crate::progress::ProgressMap;

/// Find the nearest unmet checkpoint before `target_index` in the
/// flattened sequence, scanning backward from the target.
pub fn blocking_checkpoint<'a>(
    sequence: &[(&'a Module, &'a Lesson)],
    target_index: usize,
    progress: &ProgressMap,
) -> Option<&'a Lesson> {
    sequence[..target_index]
        .iter()
        .rev()
        .map(|(_, lesson)| *lesson)
        .find(|lesson| lesson.is_stop_lesson && !is_completed(lesson, progress))
}

fn is_completed(lesson: &Lesson, progress: &ProgressMap) -> bool {
    progress
        .get(&lesson.id)
        .is_some_and(|p| p.is_completed())
}
