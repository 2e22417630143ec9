//! Gamified state engine for a home rehabilitation coach.
//!
//! Every operation here is a pure transition over [`GameState`]: it borrows
//! the current snapshot and returns a new one plus the [`ProgressEvent`]s it
//! produced. Time is read through [`Clock`] and durable data goes through
//! [`KeyValueStore`]; nothing in this crate talks to the network.

pub mod achievements;
pub mod calendar;
pub mod catalog;
pub mod checklist;
pub mod clock;
pub mod completion;
pub mod config;
pub mod diary;
pub mod error;
pub mod events;
pub mod progression;
pub mod reconcile;
pub mod reminders;
pub mod state;
pub mod storage;
pub mod streak;

pub use achievements::{evaluate_achievements, AchievementRule, RULES};
pub use catalog::{workout, Exercise, WorkoutDay, WorkoutKind, CATALOG};
pub use checklist::Checklist;
pub use clock::{Clock, FixedClock, SystemClock};
pub use completion::complete_workout;
pub use config::CoachConfig;
pub use diary::{pain_history, save_pain_log};
pub use error::{CoreError, CoreResult};
pub use events::{ProgressEvent, Transition};
pub use progression::{grant_xp, xp_threshold, ProgressSummary};
pub use reconcile::{reconcile, LoadOutcome, Loaded};
pub use reminders::{Reminder, ReminderCategory, ReminderScheduler};
pub use state::{Achievement, ChatTurn, GameState, PainLog, Role, SleepQuality};
pub use storage::{KeyValueStore, MemoryStore, STATE_KEY};
