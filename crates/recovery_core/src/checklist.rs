//! Per-day exercise checklists.
//!
//! Tick state lives outside `GameState`, one snapshot per day id per date,
//! so a half-finished session survives a restart but not a new day.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::calendar::day_key;
use crate::catalog::WorkoutDay;
use crate::error::{CoreError, CoreResult};

/// exercise name -> checked
pub type Checklist = BTreeMap<String, bool>;

pub fn checklist_key(day_id: &str, day: NaiveDate) -> String {
    format!("checkboxes_{}_{}", day_id, day_key(day))
}

/// Decode a stored snapshot. Unreadable snapshots are logged and dropped.
pub fn decode_checklist(raw: Option<&str>) -> Checklist {
    match raw {
        None => Checklist::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable checklist snapshot: {}", e);
            Checklist::new()
        }),
    }
}

/// Every exercise of `workout` ticked.
pub fn all_checked(workout: &WorkoutDay) -> Checklist {
    workout
        .exercises
        .iter()
        .map(|e| (e.name.to_string(), true))
        .collect()
}

pub fn toggle(
    checklist: &Checklist,
    workout: &WorkoutDay,
    exercise: &str,
    checked: bool,
) -> CoreResult<Checklist> {
    if workout.exercise(exercise).is_none() {
        return Err(CoreError::UnknownExercise {
            day_id: workout.id.to_string(),
            exercise: exercise.to_string(),
        });
    }
    let mut next = checklist.clone();
    next.insert(exercise.to_string(), checked);
    Ok(next)
}

pub fn is_complete(checklist: &Checklist, workout: &WorkoutDay) -> bool {
    workout
        .exercises
        .iter()
        .all(|e| checklist.get(e.name).copied().unwrap_or(false))
}
