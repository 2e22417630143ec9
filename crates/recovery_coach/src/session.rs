//! The single writer.
//!
//! `CoachSession` owns the canonical `GameState`. Every mutation goes
//! through [`CoachSession::commit`], which swaps the snapshot in and writes
//! it through to storage before the next operation can start.

use anyhow::Result;
use recovery_core::checklist::{self, checklist_key, decode_checklist, Checklist};
use recovery_core::diary::has_entry_for;
use recovery_core::{
    catalog, complete_workout, save_pain_log, ChatTurn, Clock, CoreError, GameState, KeyValueStore,
    LoadOutcome, PainLog, ProgressEvent, ProgressSummary, Transition,
};
use recovery_store::StatePersistence;
use std::sync::Arc;

use crate::generator::TextGenerator;
use crate::orchestrator::{apply_fragment, ChatOrchestrator, MessageKind};

pub const WELCOME_MESSAGE: &str =
    "¡Bienvenido! Soy tu coach de recuperación. Completa tu rutina diaria, apunta cómo te sientes en el diario y ¡a seguir sumando XP!";

/// Result of ticking or unticking an exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistUpdate {
    pub checklist: Checklist,
    /// Non-empty when the last tick completed the workout.
    pub events: Vec<ProgressEvent>,
}

pub struct CoachSession {
    state: GameState,
    persistence: StatePersistence,
    clock: Arc<dyn Clock>,
    orchestrator: ChatOrchestrator,
}

impl CoachSession {
    /// Load (or create) the stored state and start a session over it.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<(Self, LoadOutcome)> {
        let persistence = StatePersistence::new(store);
        let loaded = persistence.load(&GameState::default(), clock.now()).await?;
        tracing::info!(
            "Session opened ({:?}): level {}, streak {}",
            loaded.outcome,
            loaded.state.level,
            loaded.state.daily_streak
        );

        let session = Self {
            state: loaded.state,
            persistence,
            clock,
            orchestrator: ChatOrchestrator::new(generator),
        };
        Ok((session, loaded.outcome))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn progress(&self) -> ProgressSummary {
        ProgressSummary::of(&self.state)
    }

    /// Replace the canonical snapshot and write it through. Write failures
    /// are logged; the in-memory state stays authoritative.
    async fn commit(&mut self, next: GameState) {
        self.state = next;
        if let Err(e) = self.persistence.persist(&self.state).await {
            tracing::warn!("Failed to persist game state: {:#}", e);
        }
    }

    async fn apply(&mut self, transition: Transition) -> Vec<ProgressEvent> {
        if transition.is_noop() {
            return Vec::new();
        }
        self.commit(transition.state).await;
        transition.events
    }

    pub fn is_completed_today(&self, day_id: &str) -> bool {
        self.state.is_completed_on(day_id, self.clock.today())
    }

    /// Mark a catalog workout done for today. A repeat on the same day
    /// reports no events.
    pub async fn complete_workout(&mut self, day_id: &str) -> Result<Vec<ProgressEvent>> {
        if catalog::workout(day_id).is_none() {
            return Err(CoreError::UnknownWorkout(day_id.to_string()).into());
        }
        let transition = complete_workout(&self.state, day_id, self.clock.now());
        Ok(self.apply(transition).await)
    }

    /// Today's checklist for `day_id`. A workout already done today reads
    /// as fully ticked.
    pub async fn checklist(&self, day_id: &str) -> Result<Checklist> {
        let workout = catalog::workout(day_id)
            .ok_or_else(|| CoreError::UnknownWorkout(day_id.to_string()))?;
        if self.is_completed_today(day_id) {
            return Ok(checklist::all_checked(workout));
        }
        let key = checklist_key(day_id, self.clock.today());
        let raw = self.persistence.store().get(&key).await?;
        Ok(decode_checklist(raw.as_deref()))
    }

    /// Tick or untick one exercise. Ticking the last one completes the
    /// workout; toggles on an already completed workout are ignored.
    pub async fn toggle_exercise(
        &mut self,
        day_id: &str,
        exercise: &str,
        checked: bool,
    ) -> Result<ChecklistUpdate> {
        let workout = catalog::workout(day_id)
            .ok_or_else(|| CoreError::UnknownWorkout(day_id.to_string()))?;
        if self.is_completed_today(day_id) {
            return Ok(ChecklistUpdate {
                checklist: checklist::all_checked(workout),
                events: Vec::new(),
            });
        }

        let current = self.checklist(day_id).await?;
        let next = checklist::toggle(&current, workout, exercise, checked)?;
        let key = checklist_key(day_id, self.clock.today());
        let json = serde_json::to_string(&next)?;
        self.persistence.store().set(&key, &json).await?;

        let events = if checklist::is_complete(&next, workout) {
            tracing::info!("All exercises of {} ticked, completing it", day_id);
            self.complete_workout(day_id).await?
        } else {
            Vec::new()
        };
        Ok(ChecklistUpdate {
            checklist: next,
            events,
        })
    }

    pub fn has_logged_today(&self) -> bool {
        has_entry_for(&self.state, self.clock.today())
    }

    /// Save today's diary entry. Returns no events when one already exists.
    pub async fn save_pain_log(&mut self, log: PainLog) -> Vec<ProgressEvent> {
        let transition = save_pain_log(&self.state, log, self.clock.today());
        self.apply(transition).await
    }

    /// Send a chat message and stream the reply into the transcript.
    ///
    /// `on_fragment` sees each cumulative snapshot as it lands. Returns the
    /// final reply text, or `None` when the stream produced nothing.
    pub async fn send_message<F>(
        &mut self,
        text: &str,
        kind: MessageKind,
        mut on_fragment: F,
    ) -> Option<String>
    where
        F: FnMut(&str) + Send,
    {
        let (with_user_turn, mut stream) = self
            .orchestrator
            .send_message(&self.state, text, kind)
            .await;
        self.commit(with_user_turn).await;

        let mut reply = None;
        while let Some(fragment) = stream.recv().await {
            let next = apply_fragment(&self.state, &fragment, reply.is_none());
            self.commit(next).await;
            on_fragment(&fragment);
            reply = Some(fragment);
        }
        reply
    }

    /// Seed the first-run welcome turn. Fires at most once: does nothing if
    /// the transcript already has anything in it.
    pub async fn seed_welcome(&mut self) -> bool {
        if !self.state.chat_history.is_empty() {
            return false;
        }
        let mut next = self.state.clone();
        next.chat_history.push(ChatTurn::assistant(WELCOME_MESSAGE));
        self.commit(next).await;
        true
    }

    /// Erase the stored state and start over from defaults.
    pub async fn reset(&mut self) -> Result<()> {
        self.persistence.erase().await?;
        self.state = GameState::default();
        tracing::info!("Game state reset to defaults");
        Ok(())
    }
}
