//! Time source.
//!
//! Every "now", "today" and "yesterday" read in the engine goes through a
//! [`Clock`], so tests can pin the wall clock to a fixed instant.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Current local wall-clock instant, carrying its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Calendar day of [`Clock::now`] in local time.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reads the host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A settable clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Build from an RFC 3339 timestamp, e.g. `2026-10-17T10:00:00+02:00`.
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
