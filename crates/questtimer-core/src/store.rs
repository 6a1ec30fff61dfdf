//! The timer store: engine, focus mode and settings behind one owner.
//!
//! Collaborators are injected at construction. After every mutation the
//! affected state is written back to the [`KeyValueStore`] as a whole JSON
//! blob; a failed write is logged and the in-memory state stays
//! authoritative.
//!
//! Several stores may share one key-value store (a `watch` loop next to
//! one-shot commands). Every mutation therefore starts by re-reading the
//! blobs, so a session completed, paused or replaced elsewhere is seen
//! before this store acts on it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::focus::{FocusController, FocusMode, FocusModeUpdate, FocusOptions};
use crate::history::HistoryStats;
use crate::notify::Notifier;
use crate::quest::QuestTracker;
use crate::storage::KeyValueStore;
use crate::timer::{
    EngineOptions, TimerEngine, TimerEngineState, TimerMode, TimerSession, TimerSettings,
    TimerSettingsPatch, TimerState,
};

pub const SETTINGS_KEY: &str = "timer-settings";
pub const STATE_KEY: &str = "timer-state";

/// Everything in the `timer-state` blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    engine: TimerEngineState,
    #[serde(default)]
    focus_mode: FocusMode,
}

/// A follow-up session implied by the auto-start settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoStart {
    pub mode: TimerMode,
    pub duration_minutes: u32,
}

/// Collaborators handed to [`TimerStore::open`].
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub quests: Arc<dyn QuestTracker>,
    pub notifier: Arc<dyn Notifier>,
    pub storage: Arc<dyn KeyValueStore>,
}

pub struct TimerStore {
    engine: TimerEngine,
    focus: FocusController,
    storage: Arc<dyn KeyValueStore>,
    /// Blob text last read from or written to storage, per key.
    seen_state: Option<String>,
    seen_settings: Option<String>,
}

impl TimerStore {
    /// Build a store and load settings and state from `storage`.
    ///
    /// Unreadable blobs are logged and replaced by defaults.
    ///
    /// # Errors
    /// Returns an error only if the storage itself cannot be read.
    pub fn open(collab: Collaborators, options: EngineOptions) -> Result<Self> {
        let engine = TimerEngine::new(
            collab.clock.clone(),
            collab.quests,
            collab.notifier.clone(),
            TimerSettings::default(),
        )
        .with_options(options);
        let focus = FocusController::new(collab.clock, collab.notifier);

        let mut store = Self {
            engine,
            focus,
            storage: collab.storage,
            seen_state: None,
            seen_settings: None,
        };
        store.reload()?;
        Ok(store)
    }

    /// Pick up blobs written by another store since this one last looked.
    ///
    /// Returns true if anything was replaced. A blob that no longer parses
    /// is logged and leaves the in-memory state as it is.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    pub fn reload(&mut self) -> Result<bool> {
        let mut changed = false;

        let settings_json = self.storage.get(SETTINGS_KEY)?;
        if settings_json != self.seen_settings {
            match settings_json.as_deref().map(serde_json::from_str::<TimerSettings>) {
                Some(Ok(settings)) => self.engine.replace_settings(settings),
                Some(Err(e)) => tracing::warn!(error = %e, "discarding unreadable timer settings"),
                None => self.engine.replace_settings(TimerSettings::default()),
            }
            self.seen_settings = settings_json;
            changed = true;
        }

        let state_json = self.storage.get(STATE_KEY)?;
        if state_json != self.seen_state {
            match state_json.as_deref().map(serde_json::from_str::<PersistedState>) {
                Some(Ok(state)) => self.restore(state),
                Some(Err(e)) => tracing::warn!(error = %e, "discarding unreadable timer state"),
                None => self.restore(PersistedState::default()),
            }
            self.seen_state = state_json;
            changed = true;
        }
        Ok(changed)
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start_timer(
        &mut self,
        mode: TimerMode,
        duration_minutes: Option<u32>,
        quest_id: Option<String>,
        description: Option<String>,
    ) -> Result<Event> {
        self.sync();
        let event = self
            .engine
            .start(mode, duration_minutes, quest_id, description)?;
        self.persist_state();
        Ok(event)
    }

    pub fn pause_timer(&mut self) -> Option<Event> {
        self.mutate(TimerEngine::pause)
    }

    pub fn resume_timer(&mut self) -> Option<Event> {
        self.mutate(TimerEngine::resume)
    }

    pub fn stop_timer(&mut self, completed: bool) -> Option<Event> {
        self.mutate(|engine| engine.stop(completed))
    }

    pub fn reset_timer(&mut self) -> Option<Event> {
        self.mutate(TimerEngine::reset)
    }

    /// Poll entry point. Persists only when the session completes.
    pub fn tick(&mut self) -> Option<Event> {
        self.mutate(TimerEngine::tick)
    }

    pub fn timer_state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn current_session(&self) -> Option<&TimerSession> {
        self.engine.current_session()
    }

    pub fn remaining_ms(&self) -> u64 {
        self.engine.remaining_ms()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    pub fn get_active_quest(&self) -> Option<&str> {
        self.engine.active_quest()
    }

    /// The session the auto-start settings say should follow `finished`.
    ///
    /// Only naturally completed sessions chain: a completed pomodoro is
    /// followed by a break when `auto_start_breaks` is on (long break every
    /// `long_break_interval` pomodoros), a completed break by a pomodoro when
    /// `auto_start_pomodoros` is on.
    pub fn next_auto_start(&self, finished: &TimerSession) -> Option<AutoStart> {
        if !finished.completed {
            return None;
        }
        let settings = self.engine.settings();
        match finished.mode {
            TimerMode::Pomodoro if settings.auto_start_breaks => Some(AutoStart {
                mode: TimerMode::Break,
                duration_minutes: settings
                    .break_after(self.engine.history().completed_pomodoros()),
            }),
            TimerMode::Break if settings.auto_start_pomodoros => Some(AutoStart {
                mode: TimerMode::Pomodoro,
                duration_minutes: settings.pomodoro_duration,
            }),
            _ => None,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> &TimerSettings {
        self.engine.settings()
    }

    pub fn update_settings(&mut self, patch: &TimerSettingsPatch) -> Result<&TimerSettings> {
        self.sync();
        self.engine.update_settings(patch)?;
        self.persist_settings();
        Ok(self.engine.settings())
    }

    pub fn reset_settings(&mut self) -> &TimerSettings {
        self.engine.replace_settings(TimerSettings::default());
        self.persist_settings();
        self.engine.settings()
    }

    // ── Focus mode ───────────────────────────────────────────────────

    pub fn focus_mode(&self) -> &FocusMode {
        self.focus.mode()
    }

    pub fn enable_focus_mode(&mut self, quest_ids: Vec<String>, options: FocusOptions) -> Event {
        self.sync();
        let event = self.focus.enable(quest_ids, options);
        self.persist_state();
        event
    }

    pub fn disable_focus_mode(&mut self) -> Option<Event> {
        self.sync();
        let event = self.focus.disable();
        self.persist_state();
        event
    }

    pub fn update_focus_mode(&mut self, update: FocusModeUpdate) -> &FocusMode {
        self.sync();
        self.focus.update(update);
        self.persist_state();
        self.focus.mode()
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn get_session_history(&self) -> &[TimerSession] {
        self.engine.history().sessions()
    }

    pub fn clear_session_history(&mut self) {
        self.sync();
        self.engine.clear_history();
        self.persist_state();
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.engine.history().stats(self.engine.now_ms())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restore(&mut self, state: PersistedState) {
        self.engine.restore(state.engine);
        self.focus.restore(state.focus_mode);
    }

    fn sync(&mut self) {
        if let Err(e) = self.reload() {
            tracing::warn!(error = %e, "failed to reload timer store");
        }
    }

    fn mutate(&mut self, op: impl FnOnce(&mut TimerEngine) -> Option<Event>) -> Option<Event> {
        self.sync();
        let event = op(&mut self.engine);
        if event.is_some() {
            self.persist_state();
        }
        event
    }

    fn persist_state(&mut self) {
        let state = PersistedState {
            engine: self.engine.export_state(),
            focus_mode: self.focus.mode().clone(),
        };
        if let Some(json) = self.write(STATE_KEY, &state) {
            self.seen_state = Some(json);
        }
    }

    fn persist_settings(&mut self) {
        if let Some(json) = self.write(SETTINGS_KEY, self.engine.settings()) {
            self.seen_settings = Some(json);
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Option<String> {
        let result = serde_json::to_string(value)
            .map_err(CoreError::from)
            .and_then(|json| self.storage.set(key, &json).map(|()| json));
        match result {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to persist timer store");
                None
            }
        }
    }
}
