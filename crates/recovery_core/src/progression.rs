//! XP curve, level-ups and the progress view.

use std::borrow::Cow;

use serde::Serialize;

use crate::achievements::{evaluate_achievements, RULES};
use crate::events::{ProgressEvent, Transition};
use crate::state::{Achievement, GameState};

pub const BASE_LEVEL_XP: f64 = 100.0;
pub const LEVEL_GROWTH: f64 = 1.5;

/// XP needed to advance from `level` to `level + 1`: `100 * 1.5^(level-1)`.
pub fn xp_threshold(level: u32) -> f64 {
    let exponent = level.max(1).saturating_sub(1).min(i32::MAX as u32) as i32;
    BASE_LEVEL_XP * LEVEL_GROWTH.powi(exponent)
}

/// Add `amount` XP, carrying any excess through as many level-ups as it
/// covers, then unlock whatever achievements the new state satisfies.
pub fn grant_xp(state: &GameState, amount: f64) -> Transition {
    let mut next = state.clone();
    let mut events = Vec::new();
    apply_xp(&mut next, amount, &mut events);
    Transition {
        state: next,
        events,
    }
}

/// In-place form of [`grant_xp`] for composing larger transitions.
pub(crate) fn apply_xp(state: &mut GameState, amount: f64, events: &mut Vec<ProgressEvent>) {
    if !amount.is_finite() || amount < 0.0 {
        tracing::warn!("Ignoring invalid XP grant: {}", amount);
        return;
    }

    state.xp += amount;
    events.push(ProgressEvent::XpGained { amount });
    normalize_xp(state, events);
    apply_achievements(state, events);
}

/// Carry `xp >= threshold` into level-ups until the invariant holds.
pub fn normalize_xp(state: &mut GameState, events: &mut Vec<ProgressEvent>) {
    while state.xp >= xp_threshold(state.level) {
        state.xp -= xp_threshold(state.level);
        state.level = state.level.saturating_add(1);
        events.push(ProgressEvent::LevelUp { level: state.level });
    }
}

fn apply_achievements(state: &mut GameState, events: &mut Vec<ProgressEvent>) {
    let updated = match evaluate_achievements(state) {
        Cow::Borrowed(_) => return,
        Cow::Owned(map) => map,
    };

    for rule in RULES.iter() {
        let now_unlocked = updated.get(rule.id).is_some_and(|a| a.unlocked);
        if now_unlocked && !state.is_unlocked(rule.id) {
            events.push(ProgressEvent::AchievementUnlocked {
                id: rule.id.to_string(),
                name: rule.name.to_string(),
            });
        }
    }
    state.achievements = updated;
}

/// What the progress tab shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub level: u32,
    pub xp: f64,
    pub xp_needed: f64,
    /// Rounded percentage toward the next level.
    pub percent: u32,
    pub daily_streak: u32,
    /// In rule-set order.
    pub achievements: Vec<(String, Achievement)>,
}

impl ProgressSummary {
    pub fn of(state: &GameState) -> Self {
        let xp_needed = xp_threshold(state.level);
        let percent = ((state.xp / xp_needed) * 100.0).round().clamp(0.0, 100.0) as u32;
        let achievements = RULES
            .iter()
            .filter_map(|r| {
                state
                    .achievements
                    .get(r.id)
                    .map(|a| (r.id.to_string(), a.clone()))
            })
            .collect();

        Self {
            level: state.level,
            xp: state.xp,
            xp_needed,
            percent,
            daily_streak: state.daily_streak,
            achievements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_values() {
        assert_eq!(xp_threshold(1), 100.0);
        assert_eq!(xp_threshold(2), 150.0);
        assert_eq!(xp_threshold(3), 225.0);
        // level 0 is treated as level 1
        assert_eq!(xp_threshold(0), 100.0);
    }

    #[test]
    fn test_exact_threshold_levels_up() {
        let t = grant_xp(&GameState::default(), 100.0);
        assert_eq!(t.state.level, 2);
        assert_eq!(t.state.xp, 0.0);
        assert_eq!(
            t.events,
            vec![
                ProgressEvent::XpGained { amount: 100.0 },
                ProgressEvent::LevelUp { level: 2 },
            ]
        );
    }

    #[test]
    fn test_multi_level_carry_over() {
        let t = grant_xp(&GameState::default(), 250.0);
        assert_eq!(t.state.level, 3);
        assert_eq!(t.state.xp, 0.0);
        let levels: Vec<_> = t
            .events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::LevelUp { level } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![2, 3]);
    }

    #[test]
    fn test_below_threshold_keeps_level() {
        let t = grant_xp(&GameState::default(), 75.0);
        assert_eq!(t.state.level, 1);
        assert_eq!(t.state.xp, 75.0);
    }

    #[test]
    fn test_reaching_level_five_unlocks_achievement() {
        let mut state = GameState::default();
        state.level = 4;
        state.xp = 330.0;
        // threshold(4) = 337.5
        let t = grant_xp(&state, 25.0);
        assert_eq!(t.state.level, 5);
        assert!(t.state.is_unlocked("level_5"));
        assert_eq!(
            t.events.last(),
            Some(&ProgressEvent::AchievementUnlocked {
                id: "level_5".into(),
                name: "Veterano de la Recuperación".into(),
            })
        );
    }

    #[test]
    fn test_input_state_is_untouched() {
        let state = GameState::default();
        let _ = grant_xp(&state, 500.0);
        assert_eq!(state, GameState::default());
    }

    #[test]
    fn test_invalid_amount_is_ignored() {
        let t = grant_xp(&GameState::default(), f64::NAN);
        assert!(t.events.is_empty());
        assert_eq!(t.state, GameState::default());
    }

    #[test]
    fn test_summary_percent() {
        let mut state = GameState::default();
        state.level = 2;
        state.xp = 75.0;
        let summary = ProgressSummary::of(&state);
        assert_eq!(summary.xp_needed, 150.0);
        assert_eq!(summary.percent, 50);
        assert_eq!(summary.achievements.len(), 5);
        assert_eq!(summary.achievements[0].0, "first_daily");
    }
}
