//! Proactive reminders.
//!
//! A tick evaluates a small set of wall-clock windows. Each category fires at
//! most once per calendar day; the day it last fired is kept in the key-value
//! store under `notification_<category>`. Reminders never touch `GameState`.

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::calendar::{day_key, parse_day};
use crate::clock::Clock;
use crate::storage::KeyValueStore;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCategory {
    Morning,
    Training,
    Evening,
    Weekly,
}

impl ReminderCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Training => "training",
            Self::Evening => "evening",
            Self::Weekly => "weekly",
        }
    }

    pub fn marker_key(self) -> String {
        format!("notification_{}", self.as_str())
    }
}

/// A window `[start_hour, end_hour)` in local time, optionally limited to
/// some weekdays.
#[derive(Debug, Clone)]
pub struct ReminderRule {
    pub category: ReminderCategory,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Empty means every day.
    pub weekdays: &'static [Weekday],
    pub title: &'static str,
    pub message: &'static str,
}

impl ReminderRule {
    pub fn is_open(&self, weekday: Weekday, hour: u32) -> bool {
        (self.start_hour..self.end_hour).contains(&hour)
            && (self.weekdays.is_empty() || self.weekdays.contains(&weekday))
    }
}

const TRAINING_DAYS: &[Weekday] = &[Weekday::Mon, Weekday::Wed, Weekday::Fri];

pub fn default_rules() -> Vec<ReminderRule> {
    vec![
        ReminderRule {
            category: ReminderCategory::Morning,
            start_hour: 9,
            end_hour: 12,
            weekdays: &[],
            title: "¡A empezar!",
            message: "¡Buenos días! Un nuevo día para sumar XP. Recuerda hacer tu rutina de activación.",
        },
        ReminderRule {
            category: ReminderCategory::Training,
            start_hour: 12,
            end_hour: 18,
            weekdays: TRAINING_DAYS,
            title: "¡Día de Entreno!",
            message: "¡Misión del día! Hoy toca entrenamiento de fuerza. ¡A por esos 75 XP!",
        },
        ReminderRule {
            category: ReminderCategory::Evening,
            start_hour: 20,
            end_hour: 22,
            weekdays: &[],
            title: "¿Última misión?",
            message: "No te olvides de tu rutina diaria para mantener la racha. ¡Son 25 XP fáciles!",
        },
        ReminderRule {
            category: ReminderCategory::Weekly,
            start_hour: 18,
            end_hour: 21,
            weekdays: &[Weekday::Sun],
            title: "Balance Semanal",
            message: "¡Fin de la semana! Revisa tus logros en la pestaña de Progreso. ¡Prepárate para la siguiente!",
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub category: ReminderCategory,
    pub title: String,
    pub message: String,
}

pub struct ReminderScheduler {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    rules: Vec<ReminderRule>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            rules: default_rules(),
            interval: DEFAULT_TICK_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Evaluate every rule once. Fired categories get today's marker.
    ///
    /// A storage failure skips only the rule it happened on.
    pub async fn tick(&self) -> Vec<Reminder> {
        let now = self.clock.now();
        let today = now.date_naive();
        let (weekday, hour) = (now.weekday(), now.hour());
        let mut fired = Vec::new();

        for rule in &self.rules {
            if !rule.is_open(weekday, hour) {
                continue;
            }
            let key = rule.category.marker_key();
            let marker = match self.store.get(&key).await {
                Ok(marker) => marker,
                Err(e) => {
                    tracing::warn!("Failed to read reminder marker {}: {:#}", key, e);
                    continue;
                }
            };
            if marker.as_deref().and_then(parse_day) == Some(today) {
                continue;
            }
            if let Err(e) = self.store.set(&key, &day_key(today)).await {
                // Unmarked, it would fire again on every tick.
                tracing::warn!("Failed to write reminder marker {}: {:#}", key, e);
                continue;
            }
            tracing::info!("Reminder fired: {}", rule.category.as_str());
            fired.push(Reminder {
                category: rule.category,
                title: rule.title.to_string(),
                message: rule.message.to_string(),
            });
        }

        fired
    }

    /// Tick immediately, then every `interval`, forwarding fired reminders
    /// until the receiver is dropped.
    pub fn spawn(self, tx: mpsc::Sender<Reminder>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                for reminder in self.tick().await {
                    if tx.send(reminder).await.is_err() {
                        tracing::debug!("Reminder receiver closed, stopping scheduler");
                        return;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use anyhow::Result;
    use async_trait::async_trait;

    /// Delegates to a `MemoryStore` but fails every read of one key.
    struct BrokenKeyStore {
        inner: MemoryStore,
        broken: &'static str,
    }

    #[async_trait]
    impl KeyValueStore for BrokenKeyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if key == self.broken {
                anyhow::bail!("disk I/O error");
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    fn scheduler(at: &str) -> (ReminderScheduler, Arc<MemoryStore>, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::parse(at).unwrap());
        let s = ReminderScheduler::new(store.clone(), clock.clone());
        (s, store, clock)
    }

    fn categories(fired: &[Reminder]) -> Vec<ReminderCategory> {
        fired.iter().map(|r| r.category).collect()
    }

    #[tokio::test]
    async fn test_morning_fires_once_per_day() {
        // Saturday
        let (s, store, clock) = scheduler("2026-10-17T09:30:00+02:00");
        let fired = s.tick().await;
        assert_eq!(categories(&fired), vec![ReminderCategory::Morning]);
        assert_eq!(
            store.get("notification_morning").await.unwrap().as_deref(),
            Some("2026-10-17")
        );

        clock.advance(chrono::Duration::minutes(5));
        assert!(s.tick().await.is_empty());

        clock.advance(chrono::Duration::days(1));
        let fired = s.tick().await;
        assert_eq!(categories(&fired), vec![ReminderCategory::Morning]);
    }

    #[tokio::test]
    async fn test_window_end_is_exclusive() {
        let (s, _, _) = scheduler("2026-10-17T12:00:00+02:00");
        assert!(s.tick().await.is_empty());
    }

    #[tokio::test]
    async fn test_training_only_on_mon_wed_fri() {
        let (s, _, _) = scheduler("2026-10-17T13:00:00+02:00");
        assert!(s.tick().await.is_empty());

        // Monday
        let (s, _, _) = scheduler("2026-10-19T13:00:00+02:00");
        assert_eq!(
            categories(&s.tick().await),
            vec![ReminderCategory::Training]
        );
    }

    #[tokio::test]
    async fn test_sunday_evening_fires_weekly_and_evening() {
        let (s, _, _) = scheduler("2026-10-18T20:15:00+02:00");
        assert_eq!(
            categories(&s.tick().await),
            vec![ReminderCategory::Evening, ReminderCategory::Weekly]
        );
    }

    #[tokio::test]
    async fn test_legacy_marker_is_honored() {
        let store = Arc::new(MemoryStore::with_entries([(
            "notification_evening",
            "Sat Oct 17 2026",
        )]));
        let clock = Arc::new(FixedClock::parse("2026-10-17T21:00:00+02:00").unwrap());
        let s = ReminderScheduler::new(store, clock);
        assert!(s.tick().await.is_empty());
    }

    #[tokio::test]
    async fn test_spawned_scheduler_ticks_immediately() {
        let (s, _, _) = scheduler("2026-10-17T10:00:00+02:00");
        let (tx, mut rx) = mpsc::channel(4);
        let handle = s.with_interval(Duration::from_secs(60)).spawn(tx);
        let first = rx.recv().await.unwrap();
        assert_eq!(first.category, ReminderCategory::Morning);
        drop(rx);
        handle.abort();
    }

    #[tokio::test]
    async fn test_storage_error_skips_only_that_rule() {
        let store = Arc::new(BrokenKeyStore {
            inner: MemoryStore::new(),
            broken: "notification_evening",
        });
        // Sunday evening: evening and weekly are both open
        let clock = Arc::new(FixedClock::parse("2026-10-18T20:15:00+02:00").unwrap());
        let s = ReminderScheduler::new(store.clone(), clock);
        assert_eq!(categories(&s.tick().await), vec![ReminderCategory::Weekly]);
        assert_eq!(
            store.inner.get("notification_weekly").await.unwrap().as_deref(),
            Some("2026-10-18")
        );
        assert_eq!(store.inner.get("notification_evening").await.unwrap(), None);
    }
}
