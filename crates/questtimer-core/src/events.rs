use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerSession, TimerState};

/// Every state change in the engine and focus mode produces an Event.
/// The UI polls for snapshots; the CLI prints events as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        session_id: String,
        mode: TimerMode,
        duration_minutes: u32,
        quest_id: Option<String>,
        /// Session stopped to make room for this one (replace policy only).
        replaced_session_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        session_id: String,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        session_id: String,
        remaining_ms: u64,
        paused_for_ms: u64,
        at: DateTime<Utc>,
    },
    /// Session stopped by hand before its time ran out.
    TimerStopped {
        session: TimerSession,
        elapsed_minutes: u64,
        at: DateTime<Utc>,
    },
    /// Session ran to zero and was stopped by `tick()`.
    TimerCompleted {
        session: TimerSession,
        elapsed_minutes: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        /// `None` when nothing was active.
        session_id: Option<String>,
        at: DateTime<Utc>,
    },
    FocusEnabled {
        quest_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    FocusDisabled {
        duration_minutes: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        session: Option<TimerSession>,
        remaining_ms: u64,
        total_ms: u64,
        progress: f64,
        display: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The archived session carried by a stop/complete event.
    pub fn finished_session(&self) -> Option<&TimerSession> {
        match self {
            Event::TimerStopped { session, .. } | Event::TimerCompleted { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }
}
