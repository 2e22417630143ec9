//! Daily streak rules, shared by completion and load-time revalidation so
//! both agree on what "consecutive" means at any instant.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::calendar::local_day;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakContinuity {
    /// Never completed.
    Fresh,
    /// Last completion was today.
    SameDay,
    /// Last completion was yesterday.
    Continues,
    /// A calendar day (or more) was skipped.
    Broken,
}

pub fn streak_continuity(last: Option<NaiveDate>, today: NaiveDate) -> StreakContinuity {
    match last {
        None => StreakContinuity::Fresh,
        Some(day) if day == today => StreakContinuity::SameDay,
        Some(day) if Some(day) == today.pred_opt() => StreakContinuity::Continues,
        Some(_) => StreakContinuity::Broken,
    }
}

/// Local calendar day of the last "daily" completion, seen from `now`.
pub fn last_daily_day(state: &GameState, now: &DateTime<FixedOffset>) -> Option<NaiveDate> {
    state
        .last_daily_completion
        .as_ref()
        .map(|ts| local_day(ts, now.offset()))
}

/// Streak after completing "daily" today.
pub fn streak_after_completion(current: u32, continuity: StreakContinuity) -> u32 {
    match continuity {
        StreakContinuity::Fresh | StreakContinuity::Continues => current.saturating_add(1),
        StreakContinuity::Broken => 1,
        StreakContinuity::SameDay => current,
    }
}

/// Streak as seen at load time, before any new completion.
pub fn streak_on_load(current: u32, continuity: StreakContinuity) -> u32 {
    match continuity {
        StreakContinuity::Broken => 0,
        _ => current,
    }
}
