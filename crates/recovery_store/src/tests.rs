use crate::{SqliteStore, StatePersistence};
use chrono::{DateTime, FixedOffset};
use recovery_core::{GameState, KeyValueStore, LoadOutcome, MemoryStore, STATE_KEY};
use std::sync::Arc;

fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-10-17T10:00:00+02:00").unwrap()
}

#[tokio::test]
async fn test_kv_roundtrip() {
    let store = SqliteStore::new(":memory:")
        .await
        .expect("Failed to create store");

    assert_eq!(store.get("missing").await.unwrap(), None);

    store.set("notification_morning", "2026-10-16").await.unwrap();
    store.set("notification_morning", "2026-10-17").await.unwrap();
    assert_eq!(
        store.get("notification_morning").await.unwrap().as_deref(),
        Some("2026-10-17")
    );

    store.remove("notification_morning").await.unwrap();
    assert_eq!(store.get("notification_morning").await.unwrap(), None);

    // Removing a missing key is fine.
    store.remove("notification_morning").await.unwrap();
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("coach.db");

    {
        let store = SqliteStore::new(&db_path).await.unwrap();
        store.set(STATE_KEY, "{\"xp\":10}").await.unwrap();
    }

    let store = SqliteStore::new(&db_path).await.unwrap();
    assert_eq!(
        store.get(STATE_KEY).await.unwrap().as_deref(),
        Some("{\"xp\":10}")
    );
}

#[tokio::test]
async fn test_persist_then_load() {
    let persistence = StatePersistence::new(Arc::new(MemoryStore::new()));
    let defaults = GameState::default();

    let loaded = persistence.load(&defaults, now()).await.unwrap();
    assert_eq!(loaded.outcome, LoadOutcome::Fresh);

    let mut state = defaults.clone();
    state.xp = 40.0;
    state.level = 2;
    persistence.persist(&state).await.unwrap();

    let loaded = persistence.load(&defaults, now()).await.unwrap();
    assert_eq!(loaded.outcome, LoadOutcome::Restored);
    assert_eq!(loaded.state, state);
}

#[tokio::test]
async fn test_corrupted_blob_is_erased() {
    let store = Arc::new(MemoryStore::with_entries([(STATE_KEY, "{\"xp\": oops")]));
    let persistence = StatePersistence::new(store.clone());

    let loaded = persistence.load(&GameState::default(), now()).await.unwrap();
    assert_eq!(loaded.outcome, LoadOutcome::Reset);
    assert_eq!(loaded.state, GameState::default());
    assert_eq!(store.get(STATE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_mistyped_field_is_not_erased() {
    let raw = r#"{"schemaVersion":1,"level":4,"xp":40,"lastDailyCompletion":"not a date"}"#;
    let store = Arc::new(MemoryStore::with_entries([(STATE_KEY, raw)]));
    let persistence = StatePersistence::new(store.clone());

    let loaded = persistence.load(&GameState::default(), now()).await.unwrap();
    assert_eq!(loaded.outcome, LoadOutcome::Restored);
    assert_eq!(loaded.state.level, 4);
    assert_eq!(store.get(STATE_KEY).await.unwrap().as_deref(), Some(raw));
}

#[tokio::test]
async fn test_sqlite_backed_persistence() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::new(dir.path().join("state.db")).await.unwrap());
    let persistence = StatePersistence::new(store);

    let mut state = GameState::default();
    state.daily_streak = 2;
    state.last_daily_completion = Some(now());
    persistence.persist(&state).await.unwrap();

    let loaded = persistence.load(&GameState::default(), now()).await.unwrap();
    assert_eq!(loaded.state.daily_streak, 2);
}
