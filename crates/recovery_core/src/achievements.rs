//! Achievement rule set.
//!
//! Each rule is a monotonic threshold check over the current state, so the
//! whole set can be re-evaluated after any change without ordering concerns.

use std::borrow::Cow;

use crate::calendar::is_real_completion;
use crate::state::{Achievement, Achievements, GameState};

pub struct AchievementRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    predicate: fn(&GameState) -> bool,
}

impl AchievementRule {
    pub fn is_satisfied(&self, state: &GameState) -> bool {
        (self.predicate)(state)
    }

    /// The locked, display-ready entry for this rule.
    pub fn to_achievement(&self) -> Achievement {
        Achievement {
            name: self.name.to_string(),
            description: self.description.to_string(),
            unlocked: false,
            icon: self.icon.to_string(),
        }
    }
}

impl std::fmt::Debug for AchievementRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AchievementRule").field("id", &self.id).finish()
    }
}

fn any_real_completion(state: &GameState) -> bool {
    state.completed_workouts.values().any(|d| is_real_completion(d))
}

fn any_strength_day(state: &GameState) -> bool {
    state.completed_workouts.keys().any(|k| k.starts_with("day"))
}

fn streak_at_least_3(state: &GameState) -> bool {
    state.daily_streak >= 3
}

fn streak_at_least_7(state: &GameState) -> bool {
    state.daily_streak >= 7
}

fn level_at_least_5(state: &GameState) -> bool {
    state.level >= 5
}

pub static RULES: [AchievementRule; 5] = [
    AchievementRule {
        id: "first_daily",
        name: "Un Buen Comienzo",
        description: "Completa tu primera rutina diaria.",
        icon: "fa-play-circle",
        predicate: any_real_completion,
    },
    AchievementRule {
        id: "first_strength",
        name: "¡A Mover Hierro!",
        description: "Completa tu primer día de fuerza.",
        icon: "fa-dumbbell",
        predicate: any_strength_day,
    },
    AchievementRule {
        id: "streak_3",
        name: "Creando el Hábito",
        description: "Mantén una racha de 3 días seguidos.",
        icon: "fa-calendar-day",
        predicate: streak_at_least_3,
    },
    AchievementRule {
        id: "streak_7",
        name: "Imparable",
        description: "Mantén una racha de 7 días seguidos.",
        icon: "fa-calendar-week",
        predicate: streak_at_least_7,
    },
    AchievementRule {
        id: "level_5",
        name: "Veterano de la Recuperación",
        description: "Alcanza el nivel 5.",
        icon: "fa-star",
        predicate: level_at_least_5,
    },
];

/// All achievements, locked.
pub fn default_achievements() -> Achievements {
    RULES
        .iter()
        .map(|r| (r.id.to_string(), r.to_achievement()))
        .collect()
}

/// Flip every newly satisfied rule to unlocked.
///
/// Returns `Cow::Borrowed(&state.achievements)` when nothing new fires, so a
/// caller can skip the merge. Never re-locks an entry.
pub fn evaluate_achievements(state: &GameState) -> Cow<'_, Achievements> {
    let mut updated: Option<Achievements> = None;

    for rule in RULES.iter() {
        if state.is_unlocked(rule.id) || !rule.is_satisfied(state) {
            continue;
        }
        let map = updated.get_or_insert_with(|| state.achievements.clone());
        map.entry(rule.id.to_string())
            .or_insert_with(|| rule.to_achievement())
            .unlocked = true;
    }

    match updated {
        Some(map) => Cow::Owned(map),
        None => Cow::Borrowed(&state.achievements),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_change_borrows_original_map() {
        let state = GameState::default();
        assert!(matches!(evaluate_achievements(&state), Cow::Borrowed(_)));
    }

    #[test]
    fn test_first_daily_ignores_epoch_sentinel() {
        let mut state = GameState::default();
        state
            .completed_workouts
            .insert("daily".into(), "1970-01-01".into());
        assert!(matches!(evaluate_achievements(&state), Cow::Borrowed(_)));

        state
            .completed_workouts
            .insert("daily".into(), "2026-10-17".into());
        let updated = evaluate_achievements(&state);
        assert!(updated["first_daily"].unlocked);
        assert!(!updated["first_strength"].unlocked);
    }

    #[test]
    fn test_first_strength_matches_day_prefix() {
        let mut state = GameState::default();
        state
            .completed_workouts
            .insert("day2".into(), "2026-10-17".into());
        let updated = evaluate_achievements(&state);
        assert!(updated["first_strength"].unlocked);
    }

    #[test]
    fn test_thresholds() {
        let mut state = GameState::default();
        state.daily_streak = 7;
        state.level = 5;
        let updated = evaluate_achievements(&state);
        assert!(updated["streak_3"].unlocked);
        assert!(updated["streak_7"].unlocked);
        assert!(updated["level_5"].unlocked);
    }

    #[test]
    fn test_never_relocks() {
        let mut state = GameState::default();
        state.level = 5;
        state.achievements = evaluate_achievements(&state).into_owned();
        assert!(state.is_unlocked("level_5"));

        // Re-evaluating, even after the predicate stops holding, keeps it.
        state.level = 1;
        let again = evaluate_achievements(&state);
        assert!(matches!(again, Cow::Borrowed(_)));
        assert!(again["level_5"].unlocked);
    }

    #[test]
    fn test_restores_missing_entry_when_unlocking() {
        let mut state = GameState::default();
        state.achievements.remove("level_5");
        state.level = 6;
        let updated = evaluate_achievements(&state);
        assert_eq!(updated["level_5"].name, "Veterano de la Recuperación");
        assert!(updated["level_5"].unlocked);
    }
}
