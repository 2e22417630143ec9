//! Loading and saving the `GameState` blob.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use recovery_core::{reconcile, GameState, KeyValueStore, LoadOutcome, Loaded, STATE_KEY};
use std::sync::Arc;

#[derive(Clone)]
pub struct StatePersistence {
    store: Arc<dyn KeyValueStore>,
}

impl StatePersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read and reconcile the stored blob. A corrupted blob is erased.
    pub async fn load(&self, defaults: &GameState, now: DateTime<FixedOffset>) -> Result<Loaded> {
        let raw = self.store.get(STATE_KEY).await?;
        let loaded = reconcile(raw.as_deref(), defaults, now);
        if loaded.outcome == LoadOutcome::Reset {
            self.erase().await?;
        }
        Ok(loaded)
    }

    pub async fn persist(&self, state: &GameState) -> Result<()> {
        let json = state.to_json().context("Failed to serialize game state")?;
        self.store.set(STATE_KEY, &json).await
    }

    pub async fn erase(&self) -> Result<()> {
        self.store.remove(STATE_KEY).await
    }
}
