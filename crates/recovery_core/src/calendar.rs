//! Calendar-day keys.
//!
//! Days are compared by local calendar identity, never by elapsed hours.
//! Keys are written as `YYYY-MM-DD`; the long form `Sat Oct 17 2026` found in
//! older saves is still accepted on read.

use chrono::{DateTime, FixedOffset, NaiveDate};

pub const DAY_FORMAT: &str = "%Y-%m-%d";
const LEGACY_DAY_FORMAT: &str = "%a %b %d %Y";

pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY_DAY_FORMAT))
        .ok()
}

/// The "never completed" sentinel (1970-01-01).
pub fn epoch_day() -> NaiveDate {
    NaiveDate::default()
}

/// True when `raw` names an actual day, not the epoch sentinel or garbage.
pub fn is_real_completion(raw: &str) -> bool {
    parse_day(raw).is_some_and(|day| day != epoch_day())
}

/// Local calendar day of a stored instant, seen from `offset`.
pub fn local_day(instant: &DateTime<FixedOffset>, offset: &FixedOffset) -> NaiveDate {
    instant.with_timezone(offset).date_naive()
}
