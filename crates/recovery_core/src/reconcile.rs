//! Load-time reconciliation of a stored blob against current defaults.
//!
//! Stored data is never trusted as-is: every field is merged over the
//! defaults, achievements are rebuilt from the current rule set, older
//! schema versions are migrated, and the streak is revalidated against the
//! load date.

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::calendar::{day_key, local_day, parse_day};
use crate::error::{CoreError, CoreResult};
use crate::progression::normalize_xp;
use crate::state::{Achievements, ChatTurn, GameState, PainLog, SCHEMA_VERSION};
use crate::streak::{streak_continuity, streak_on_load};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Fresh,
    /// A stored blob was merged.
    Restored,
    /// The stored blob was unreadable; caller should erase it.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub state: GameState,
    pub outcome: LoadOutcome,
}

/// Only the unlock flag survives from a stored achievement.
#[derive(Debug, Default, Deserialize)]
struct StoredAchievement {
    #[serde(default)]
    unlocked: Option<bool>,
}

type StoredObject = Map<String, Value>;

/// Only unparseable JSON, or JSON that is not an object, is fatal.
fn decode(raw: &str) -> CoreResult<StoredObject> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CoreError::StateDecode(format!(
            "expected an object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CoreError::StateDecode(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode one top-level field. Missing and `null` read as absent; a value
/// of the wrong shape is logged and read as absent too.
fn field<T: DeserializeOwned>(stored: &StoredObject, name: &str) -> Option<T> {
    let value = stored.get(name).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!("Ignoring unreadable stored field {}: {}", name, e);
            None
        }
    }
}

/// Decode a keyed map entry by entry, dropping only the unreadable ones.
fn entries<T: DeserializeOwned>(stored: &StoredObject, name: &str) -> Option<BTreeMap<String, T>> {
    let value = stored.get(name).filter(|v| !v.is_null())?;
    let Some(object) = value.as_object() else {
        tracing::warn!("Ignoring stored field {}: expected an object", name);
        return None;
    };
    let decoded: BTreeMap<String, T> = object
        .iter()
        .filter_map(|(key, entry)| match T::deserialize(entry) {
            Ok(v) => Some((key.clone(), v)),
            Err(e) => {
                tracing::warn!("Dropping unreadable {} entry {}: {}", name, key, e);
                None
            }
        })
        .collect();
    Some(decoded)
}

/// Decode a list item by item, dropping only the unreadable ones.
fn items<T: DeserializeOwned>(stored: &StoredObject, name: &str) -> Option<Vec<T>> {
    let value = stored.get(name).filter(|v| !v.is_null())?;
    let Some(array) = value.as_array() else {
        tracing::warn!("Ignoring stored field {}: expected an array", name);
        return None;
    };
    let decoded: Vec<T> = array
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match T::deserialize(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Dropping unreadable {} item {}: {}", name, i, e);
                None
            }
        })
        .collect();
    Some(decoded)
}

/// Turn an optional stored blob into a usable state as of `now`.
pub fn reconcile(raw: Option<&str>, defaults: &GameState, now: DateTime<FixedOffset>) -> Loaded {
    let Some(raw) = raw else {
        return Loaded {
            state: defaults.clone(),
            outcome: LoadOutcome::Fresh,
        };
    };

    match decode(raw) {
        Ok(stored) => Loaded {
            state: merge(&stored, defaults, now),
            outcome: LoadOutcome::Restored,
        },
        Err(e) => {
            tracing::error!("Failed to load game state, resetting: {}", e);
            Loaded {
                state: defaults.clone(),
                outcome: LoadOutcome::Reset,
            }
        }
    }
}

fn merge(stored: &StoredObject, defaults: &GameState, now: DateTime<FixedOffset>) -> GameState {
    let version = field::<u32>(stored, "schemaVersion").unwrap_or(0);
    let stored_achievements = entries::<StoredAchievement>(stored, "achievements");
    let last_daily_completion = field::<DateTime<FixedOffset>>(stored, "lastDailyCompletion");
    // A completion date that exists but can't be read can't vouch for the streak.
    let unreadable_completion = last_daily_completion.is_none()
        && stored
            .get("lastDailyCompletion")
            .is_some_and(|v| !v.is_null());

    let mut state = GameState {
        schema_version: SCHEMA_VERSION,
        xp: field(stored, "xp").unwrap_or(defaults.xp),
        level: field(stored, "level").unwrap_or(defaults.level),
        daily_streak: field(stored, "dailyStreak").unwrap_or(defaults.daily_streak),
        last_daily_completion: last_daily_completion.or(defaults.last_daily_completion),
        completed_workouts: entries(stored, "completedWorkouts")
            .unwrap_or_else(|| defaults.completed_workouts.clone()),
        achievements: merge_achievements(&defaults.achievements, stored_achievements.as_ref()),
        chat_history: items::<ChatTurn>(stored, "chatHistory")
            .unwrap_or_else(|| defaults.chat_history.clone()),
        pain_diary: entries::<PainLog>(stored, "painDiary")
            .unwrap_or_else(|| defaults.pain_diary.clone()),
    };

    if unreadable_completion && state.daily_streak != 0 {
        tracing::warn!("Last daily completion unreadable, resetting streak");
        state.daily_streak = 0;
    }
    if version < SCHEMA_VERSION {
        migrate_v0(&mut state);
    }
    sanitize(&mut state);
    revalidate_streak(&mut state, now);
    state
}

/// Rule-set entries as the template, stored `unlocked` flags as the override.
/// Ids the rule set no longer knows are dropped.
fn merge_achievements(
    defaults: &Achievements,
    stored: Option<&BTreeMap<String, StoredAchievement>>,
) -> Achievements {
    defaults
        .iter()
        .map(|(id, template)| {
            let mut merged = template.clone();
            if let Some(unlocked) = stored.and_then(|s| s.get(id)).and_then(|a| a.unlocked) {
                merged.unlocked = unlocked;
            }
            (id.clone(), merged)
        })
        .collect()
}

/// v0 saves wrote long-form dates (`Sat Oct 17 2026`).
fn migrate_v0(state: &mut GameState) {
    let mut rewritten = 0usize;
    for value in state.completed_workouts.values_mut() {
        if let Some(day) = parse_day(value) {
            let key = day_key(day);
            if *value != key {
                *value = key;
                rewritten += 1;
            }
        }
    }
    tracing::info!(
        "Migrated stored state to schema v{} ({} dates rewritten)",
        SCHEMA_VERSION,
        rewritten
    );
}

fn sanitize(state: &mut GameState) {
    if state.level == 0 {
        tracing::warn!("Stored level was 0, clamping to 1");
        state.level = 1;
    }
    if !state.xp.is_finite() || state.xp < 0.0 {
        tracing::warn!("Stored xp {} is invalid, resetting to 0", state.xp);
        state.xp = 0.0;
    }
    // Carry stale overflow into levels; no events on load.
    normalize_xp(state, &mut Vec::new());
}

fn revalidate_streak(state: &mut GameState, now: DateTime<FixedOffset>) {
    let Some(last) = state.last_daily_completion else {
        return;
    };
    let continuity = streak_continuity(Some(local_day(&last, now.offset())), now.date_naive());
    let streak = streak_on_load(state.daily_streak, continuity);
    if streak != state.daily_streak {
        tracing::info!(
            "Daily streak of {} lapsed (last completion {}), resetting",
            state.daily_streak,
            last
        );
        state.daily_streak = streak;
    }
}
