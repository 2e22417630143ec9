//! The aggregate root: everything the coach remembers about the user.
//!
//! `GameState` is never shared mutably. Each operation takes `&GameState` and
//! returns a fresh snapshot inside a [`Transition`](crate::events::Transition);
//! the session swaps it in and persists it.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::achievements::default_achievements;
use crate::calendar::{day_key, parse_day};
use crate::error::CoreError;

/// Version written by this build. Blobs without a version are treated as 0.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    #[serde(rename = "desc", alias = "description")]
    pub description: String,
    pub unlocked: bool,
    pub icon: String,
}

pub type Achievements = BTreeMap<String, Achievement>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

/// One transcript entry.
///
/// Older saves store turns as `{role: "model", parts: [{text}]}`; those are
/// folded into `text` on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTurn")]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Deserialize)]
struct StoredTurn {
    role: Role,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    parts: Vec<StoredPart>,
}

#[derive(Deserialize)]
struct StoredPart {
    #[serde(default)]
    text: String,
}

impl From<StoredTurn> for ChatTurn {
    fn from(stored: StoredTurn) -> Self {
        let text = stored.text.unwrap_or_else(|| {
            stored
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .concat()
        });
        Self {
            role: stored.role,
            text,
        }
    }
}

/// Self-reported sleep quality, stored as its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SleepQuality {
    Poor = 1,
    Fair = 2,
    Good = 3,
}

impl TryFrom<u8> for SleepQuality {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Poor),
            2 => Ok(Self::Fair),
            3 => Ok(Self::Good),
            other => Err(CoreError::InvalidSleepQuality(other)),
        }
    }
}

impl From<SleepQuality> for u8 {
    fn from(quality: SleepQuality) -> Self {
        quality as u8
    }
}

impl SleepQuality {
    pub fn label(self) -> &'static str {
        match self {
            Self::Poor => "Mala",
            Self::Fair => "Regular",
            Self::Good => "Buena",
        }
    }
}

/// One day's wellness entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainLog {
    pub pain: u8,
    pub stress: u8,
    pub sleep: SleepQuality,
}

impl PainLog {
    pub const MAX_SCALE: u8 = 10;

    /// Validating constructor. `pain` and `stress` are 0–10, `sleep` is 1–3.
    pub fn new(pain: u8, stress: u8, sleep: u8) -> Result<Self, CoreError> {
        if pain > Self::MAX_SCALE {
            return Err(CoreError::OutOfRange {
                field: "pain",
                value: pain,
            });
        }
        if stress > Self::MAX_SCALE {
            return Err(CoreError::OutOfRange {
                field: "stress",
                value: stress,
            });
        }
        Ok(Self {
            pain,
            stress,
            sleep: SleepQuality::try_from(sleep)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub schema_version: u32,
    /// XP accumulated toward the next level. Always `< xp_threshold(level)`.
    pub xp: f64,
    pub level: u32,
    pub daily_streak: u32,
    pub last_daily_completion: Option<DateTime<FixedOffset>>,
    /// day id -> `YYYY-MM-DD` of its most recent completion
    pub completed_workouts: BTreeMap<String, String>,
    pub achievements: Achievements,
    pub chat_history: Vec<ChatTurn>,
    /// `YYYY-MM-DD` -> entry; one per day, never overwritten
    pub pain_diary: BTreeMap<String, PainLog>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            xp: 0.0,
            level: 1,
            daily_streak: 0,
            last_daily_completion: None,
            completed_workouts: BTreeMap::new(),
            achievements: default_achievements(),
            chat_history: Vec::new(),
            pain_diary: BTreeMap::new(),
        }
    }
}

impl GameState {
    /// Whether `day_id` was completed on `day`.
    pub fn is_completed_on(&self, day_id: &str, day: NaiveDate) -> bool {
        self.completed_workouts
            .get(day_id)
            .and_then(|raw| parse_day(raw))
            == Some(day)
    }

    pub fn diary_entry(&self, day: NaiveDate) -> Option<&PainLog> {
        self.pain_diary.get(&day_key(day))
    }

    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.achievements
            .get(achievement_id)
            .is_some_and(|a| a.unlocked)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = GameState::default();
        assert_eq!(state.level, 1);
        assert_eq!(state.xp, 0.0);
        assert_eq!(state.daily_streak, 0);
        assert!(state.last_daily_completion.is_none());
        assert_eq!(state.achievements.len(), 5);
        assert!(state.achievements.values().all(|a| !a.unlocked));
    }

    #[test]
    fn test_serializes_camel_case_fields() {
        let json = GameState::default().to_json().unwrap();
        assert!(json.contains("\"dailyStreak\":0"));
        assert!(json.contains("\"lastDailyCompletion\":null"));
        assert!(json.contains("\"painDiary\":{}"));
        assert!(json.contains("\"desc\":"));
    }

    #[test]
    fn test_legacy_chat_turn_shape() {
        let turn: ChatTurn =
            serde_json::from_str(r#"{"role":"model","parts":[{"text":"Hola"},{"text":"!"}]}"#)
                .unwrap();
        assert_eq!(turn, ChatTurn::assistant("Hola!"));

        let turn: ChatTurn = serde_json::from_str(r#"{"role":"user","text":"hey"}"#).unwrap();
        assert_eq!(turn, ChatTurn::user("hey"));
    }

    #[test]
    fn test_pain_log_validation() {
        assert!(PainLog::new(3, 4, 3).is_ok());
        assert_eq!(
            PainLog::new(11, 0, 1),
            Err(CoreError::OutOfRange {
                field: "pain",
                value: 11
            })
        );
        assert_eq!(
            PainLog::new(0, 12, 1),
            Err(CoreError::OutOfRange {
                field: "stress",
                value: 12
            })
        );
        assert_eq!(PainLog::new(0, 0, 4), Err(CoreError::InvalidSleepQuality(4)));
    }

    #[test]
    fn test_sleep_quality_serializes_as_ordinal() {
        let log = PainLog::new(2, 5, 1).unwrap();
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"{"pain":2,"stress":5,"sleep":1}"#);
        assert!(serde_json::from_str::<PainLog>(r#"{"pain":2,"stress":5,"sleep":9}"#).is_err());
    }

    #[test]
    fn test_is_completed_on_reads_legacy_dates() {
        let mut state = GameState::default();
        state
            .completed_workouts
            .insert("daily".into(), "Sat Oct 17 2026".into());
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(state.is_completed_on("daily", day));
        assert!(!state.is_completed_on("day1", day));
    }
}
