//! Timer session engine.
//!
//! The engine is a wall-clock-based state machine holding at most one active
//! session. It does not use internal threads - the caller is responsible for
//! calling `tick()` periodically (once a second is plenty).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -start-> Running -pause-> Paused -resume-> Running
//! {Running, Paused} -stop-> Idle        (archived to history)
//! {Running, Paused, Idle} -reset-> Idle (discarded)
//! ```
//!
//! Collaborators (quest tracker, notifier) are called only after the state
//! transition has been committed, and their failures are logged and dropped.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(clock, quests, notifier, TimerSettings::default());
//! engine.start(TimerMode::Pomodoro, None, Some("quest-1".into()), None)?;
//! // In a loop:
//! engine.tick(); // Returns Some(Event::TimerCompleted) once time runs out
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::format::format_time;
use super::session::{TimerMode, TimerSession, TimerState};
use super::settings::{TimerSettings, TimerSettingsPatch};
use crate::clock::{to_datetime, Clock};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::history::SessionHistory;
use crate::notify::{self, NotificationKind, NotificationPriority, NotificationRequest, Notifier};
use crate::quest::QuestTracker;

/// What `start` does when a session is already active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPolicy {
    /// Refuse with `ValidationError::SessionActive`.
    #[default]
    Reject,
    /// Stop the active session (not completed) and start the new one.
    Replace,
}

/// Engine behaviour that is not a user setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub start_policy: StartPolicy,
    /// Used by `focus` sessions started without a duration.
    #[serde(default = "default_focus_fallback")]
    pub focus_fallback_min: u32,
    /// Used by `custom` sessions started without a duration.
    #[serde(default = "default_custom_fallback")]
    pub custom_fallback_min: u32,
}

fn default_focus_fallback() -> u32 {
    60
}
fn default_custom_fallback() -> u32 {
    25
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            start_policy: StartPolicy::Reject,
            focus_fallback_min: default_focus_fallback(),
            custom_fallback_min: default_custom_fallback(),
        }
    }
}

/// Serializable part of the engine: what gets snapshotted to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEngineState {
    #[serde(default)]
    pub current: Option<TimerSession>,
    #[serde(default)]
    pub history: SessionHistory,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas read from an injected [`Clock`].
pub struct TimerEngine {
    clock: Arc<dyn Clock>,
    quests: Arc<dyn QuestTracker>,
    notifier: Arc<dyn Notifier>,
    settings: TimerSettings,
    options: EngineOptions,
    current: Option<TimerSession>,
    history: SessionHistory,
}

impl TimerEngine {
    pub fn new(
        clock: Arc<dyn Clock>,
        quests: Arc<dyn QuestTracker>,
        notifier: Arc<dyn Notifier>,
        settings: TimerSettings,
    ) -> Self {
        Self {
            clock,
            quests,
            notifier,
            settings,
            options: EngineOptions::default(),
            current: None,
            history: SessionHistory::new(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the live session and history with a previously saved state.
    pub fn restore(&mut self, state: TimerEngineState) {
        self.current = state.current.filter(|s| !s.is_finished());
        self.history = state.history;
    }

    pub fn export_state(&self) -> TimerEngineState {
        TimerEngineState {
            current: self.current.clone(),
            history: self.history.clone(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match &self.current {
            None => TimerState::Idle,
            Some(s) if s.is_paused() => TimerState::Paused,
            Some(_) => TimerState::Running,
        }
    }

    pub fn current_session(&self) -> Option<&TimerSession> {
        self.current.as_ref()
    }

    pub fn active_quest(&self) -> Option<&str> {
        self.current.as_ref().and_then(|s| s.quest_id.as_deref())
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Remaining time of the active session, 0 when idle.
    pub fn remaining_ms(&self) -> u64 {
        let now = self.clock.now_ms();
        self.current.as_ref().map(|s| s.remaining_ms(now)).unwrap_or(0)
    }

    pub fn elapsed_ms(&self) -> u64 {
        let now = self.clock.now_ms();
        self.current.as_ref().map(|s| s.elapsed_ms(now)).unwrap_or(0)
    }

    pub fn total_ms(&self) -> u64 {
        self.current.as_ref().map(|s| s.duration_ms()).unwrap_or(0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let now = self.clock.now_ms();
        let remaining_ms = self.current.as_ref().map(|s| s.remaining_ms(now)).unwrap_or(0);
        Event::StateSnapshot {
            state: self.state(),
            session: self.current.clone(),
            remaining_ms,
            total_ms: self.total_ms(),
            progress: self.current.as_ref().map(|s| s.progress(now)).unwrap_or(0.0),
            display: format_time(remaining_ms),
            at: to_datetime(now),
        }
    }

    /// Minutes a session of `mode` will last when started with `requested`.
    pub fn resolve_duration(&self, mode: TimerMode, requested: Option<u32>) -> u32 {
        if let Some(minutes) = requested {
            return minutes;
        }
        match mode {
            TimerMode::Pomodoro => self.settings.pomodoro_duration,
            TimerMode::Break => self.settings.short_break_duration,
            TimerMode::Focus => self.options.focus_fallback_min,
            TimerMode::Custom => self.options.custom_fallback_min,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session.
    ///
    /// # Errors
    /// `InvalidDuration` if the resolved duration is zero, `SessionActive` if a
    /// session is active and the start policy is `Reject`. State is unchanged
    /// on error.
    pub fn start(
        &mut self,
        mode: TimerMode,
        duration_minutes: Option<u32>,
        quest_id: Option<String>,
        description: Option<String>,
    ) -> Result<Event> {
        let minutes = self.resolve_duration(mode, duration_minutes);
        if minutes == 0 {
            return Err(ValidationError::InvalidDuration { minutes }.into());
        }

        let replaced_session_id = if let Some(active) = &self.current {
            if self.options.start_policy == StartPolicy::Reject {
                return Err(ValidationError::SessionActive {
                    session_id: active.id.clone(),
                }
                .into());
            }
            self.stop(false)
                .and_then(|ev| ev.finished_session().map(|s| s.id.clone()))
        } else {
            None
        };

        let now = self.clock.now_ms();
        let session = TimerSession::begin(
            Uuid::new_v4().to_string(),
            mode,
            minutes,
            quest_id.filter(|q| !q.is_empty()),
            description.filter(|d| !d.trim().is_empty()),
            now,
        );
        let event = Event::TimerStarted {
            session_id: session.id.clone(),
            mode,
            duration_minutes: minutes,
            quest_id: session.quest_id.clone(),
            replaced_session_id,
            at: to_datetime(now),
        };
        let quest = session.quest_id.clone();
        tracing::debug!(session_id = %session.id, %mode, minutes, "timer started");
        self.current = Some(session);

        if let Some(quest_id) = quest {
            if let Err(e) = self.quests.begin_accrual(&quest_id) {
                tracing::warn!(%quest_id, error = %e, "failed to begin quest time accrual");
            }
        }
        Ok(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        match self.current.as_mut() {
            Some(session) if !session.is_paused() => {
                session.pause(now);
                tracing::debug!(session_id = %session.id, "timer paused");
                Some(Event::TimerPaused {
                    session_id: session.id.clone(),
                    remaining_ms: session.remaining_ms(now),
                    at: to_datetime(now),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        match self.current.as_mut() {
            Some(session) if session.is_paused() => {
                let gap = session.resume(now);
                tracing::debug!(session_id = %session.id, gap_ms = gap, "timer resumed");
                Some(Event::TimerResumed {
                    session_id: session.id.clone(),
                    remaining_ms: session.remaining_ms(now),
                    paused_for_ms: gap,
                    at: to_datetime(now),
                })
            }
            _ => None,
        }
    }

    /// Stop and archive the active session. No-op when idle.
    pub fn stop(&mut self, completed: bool) -> Option<Event> {
        let mut session = self.current.take()?;
        let now = self.clock.now_ms();
        session.finish(now, completed);
        let elapsed_minutes = session.elapsed_minutes(now);
        self.history.push(session.clone());
        tracing::debug!(session_id = %session.id, completed, elapsed_minutes, "timer stopped");

        if let Some(quest_id) = &session.quest_id {
            let summary = format!("{} session - {} minutes", session.mode, elapsed_minutes);
            let description = match &session.description {
                Some(text) => format!("{text} ({summary})"),
                None => summary,
            };
            if let Err(e) = self
                .quests
                .end_accrual(quest_id, elapsed_minutes, Some(&description))
            {
                tracing::warn!(%quest_id, error = %e, "failed to end quest time accrual");
            }
        }

        let at = to_datetime(now);
        if completed {
            let request = NotificationRequest::new(
                NotificationKind::Timer,
                NotificationPriority::Medium,
                "Timer Completed!",
                format!(
                    "Your {} session of {} minutes is complete.",
                    session.mode, session.duration_minutes
                ),
            )
            .with_quest(session.quest_id.clone());
            notify::dispatch(self.notifier.as_ref(), request);
            Some(Event::TimerCompleted {
                session,
                elapsed_minutes,
                at,
            })
        } else {
            Some(Event::TimerStopped {
                session,
                elapsed_minutes,
                at,
            })
        }
    }

    /// Discard the active session without archiving or crediting time.
    pub fn reset(&mut self) -> Option<Event> {
        let discarded = self.current.take();
        let at = to_datetime(self.clock.now_ms());

        if let Some(quest_id) = discarded.as_ref().and_then(|s| s.quest_id.as_deref()) {
            if let Err(e) = self.quests.cancel_accrual(quest_id) {
                tracing::warn!(%quest_id, error = %e, "failed to cancel quest time accrual");
            }
        }
        Some(Event::TimerReset {
            session_id: discarded.map(|s| s.id),
            at,
        })
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` exactly once
    /// when the running session reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        match &self.current {
            Some(session) if !session.is_paused() && session.remaining_ms(now) == 0 => {
                self.stop(true)
            }
            _ => None,
        }
    }

    /// Merge `patch` into the settings.
    ///
    /// # Errors
    /// Returns a validation error and keeps the old settings if the result
    /// would contain a zero duration.
    pub fn update_settings(&mut self, patch: &TimerSettingsPatch) -> Result<&TimerSettings> {
        self.settings = self.settings.merged(patch)?;
        Ok(&self.settings)
    }

    pub fn replace_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
