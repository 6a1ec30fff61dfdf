//! # questtimer Core Library
//!
//! The timing core of a quest (to-do/habit) tracker: a Pomodoro-style timer
//! session engine that can be bound to a quest, a focus-mode flag, timer
//! settings and a session history. The `questtimer` CLI is a thin layer over
//! the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()`; it never owns a thread or interval
//! - **Focus Mode**: An independent on/off flag with the quests in focus
//! - **Timer Store**: Owns both, snapshotting them to a key-value store after
//!   every mutation
//! - **Ports**: [`QuestTracker`], [`Notifier`], [`KeyValueStore`] and
//!   [`Clock`] are injected; [`Database`] implements the first three on SQLite
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusController`]: Focus mode state
//! - [`TimerStore`]: Persisted facade used by UIs
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod focus;
pub mod history;
pub mod notify;
pub mod quest;
pub mod storage;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use focus::{FocusController, FocusMode, FocusModeUpdate, FocusOptions};
pub use history::{HistoryStats, SessionHistory};
pub use notify::{NotificationKind, NotificationPriority, NotificationRequest, Notifier};
pub use quest::{QuestTracker, TimeEntry};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, Notification};
pub use store::{AutoStart, Collaborators, TimerStore};
pub use timer::{
    format_time, EngineOptions, StartPolicy, TimerEngine, TimerMode, TimerSession, TimerSettings,
    TimerSettingsPatch, TimerState,
};
