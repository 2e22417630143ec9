//! Workout completion bookkeeping.

use chrono::{DateTime, FixedOffset};

use crate::calendar::day_key;
use crate::catalog::WorkoutKind;
use crate::events::{ProgressEvent, Transition};
use crate::progression::apply_xp;
use crate::state::GameState;
use crate::streak::{last_daily_day, streak_after_completion, streak_continuity};

pub const DAILY_XP: f64 = 25.0;
pub const STRENGTH_XP: f64 = 75.0;

/// Record that `day_id` was completed at `now`.
///
/// At most once per identifier per local calendar day: a second call on the
/// same day returns the state unchanged. The streak update and the XP grant
/// land in the same returned snapshot.
pub fn complete_workout(state: &GameState, day_id: &str, now: DateTime<FixedOffset>) -> Transition {
    let today = now.date_naive();
    if state.is_completed_on(day_id, today) {
        tracing::debug!("{} already completed on {}, skipping", day_id, today);
        return Transition::unchanged(state);
    }

    let mut next = state.clone();
    next.completed_workouts
        .insert(day_id.to_string(), day_key(today));
    let mut events = vec![ProgressEvent::WorkoutCompleted {
        day_id: day_id.to_string(),
    }];

    match WorkoutKind::of(day_id) {
        WorkoutKind::Daily => {
            let continuity = streak_continuity(last_daily_day(state, &now), today);
            next.daily_streak = streak_after_completion(next.daily_streak, continuity);
            next.last_daily_completion = Some(now);
            events.push(ProgressEvent::StreakExtended {
                streak: next.daily_streak,
            });
            apply_xp(&mut next, DAILY_XP, &mut events);
        }
        WorkoutKind::Warmup => {}
        WorkoutKind::Strength => apply_xp(&mut next, STRENGTH_XP, &mut events),
    }

    tracing::info!(
        "Completed {} (level {}, xp {:.0}, streak {})",
        day_id,
        next.level,
        next.xp,
        next.daily_streak
    );

    Transition {
        state: next,
        events,
    }
}
