//! Daily wellness diary.

use chrono::NaiveDate;

use crate::calendar::{day_key, parse_day};
use crate::events::{ProgressEvent, Transition};
use crate::state::{GameState, PainLog};

/// Store `log` under `today`. An existing entry for that day is kept and
/// the call is a no-op.
pub fn save_pain_log(state: &GameState, log: PainLog, today: NaiveDate) -> Transition {
    let key = day_key(today);
    if state.pain_diary.contains_key(&key) {
        tracing::debug!("Diary entry for {} already exists, keeping it", key);
        return Transition::unchanged(state);
    }

    let mut next = state.clone();
    next.pain_diary.insert(key.clone(), log);
    Transition {
        state: next,
        events: vec![ProgressEvent::DiarySaved { date: key }],
    }
}

pub fn has_entry_for(state: &GameState, day: NaiveDate) -> bool {
    state.diary_entry(day).is_some()
}

/// Pain level per day, oldest first.
pub fn pain_history(state: &GameState) -> Vec<(NaiveDate, u8)> {
    let mut points: Vec<_> = state
        .pain_diary
        .iter()
        .filter_map(|(k, log)| parse_day(k).map(|d| (d, log.pain)))
        .collect();
    points.sort_by_key(|(d, _)| *d);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_second_save_same_day_keeps_original() {
        let first = PainLog::new(3, 4, 3).unwrap();
        let second = PainLog::new(9, 9, 1).unwrap();

        let t1 = save_pain_log(&GameState::default(), first, day(17));
        assert_eq!(t1.events.len(), 1);
        let t2 = save_pain_log(&t1.state, second, day(17));
        assert!(t2.is_noop());
        assert_eq!(t2.state.diary_entry(day(17)), Some(&first));
    }

    #[test]
    fn test_next_day_gets_its_own_entry() {
        let log = PainLog::new(2, 2, 2).unwrap();
        let s = save_pain_log(&GameState::default(), log, day(17)).state;
        let s = save_pain_log(&s, log, day(18)).state;
        assert_eq!(s.pain_diary.len(), 2);
        assert!(has_entry_for(&s, day(18)));
    }

    #[test]
    fn test_pain_history_sorted() {
        let mut state = GameState::default();
        for (d, pain) in [(20, 2), (3, 6), (11, 4)] {
            state = save_pain_log(&state, PainLog::new(pain, 0, 3).unwrap(), day(d)).state;
        }
        assert_eq!(
            pain_history(&state),
            vec![(day(3), 6), (day(11), 4), (day(20), 2)]
        );
    }
}
