use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What kind of session is being timed. Selects the default duration when
/// the caller does not give one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Pomodoro,
    Focus,
    Break,
    Custom,
}

impl TimerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "pomodoro",
            TimerMode::Focus => "focus",
            TimerMode::Break => "break",
            TimerMode::Custom => "custom",
        }
    }

    /// Whether time spent in this mode counts as work.
    pub fn is_work(self) -> bool {
        !matches!(self, TimerMode::Break)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pomodoro" => Ok(TimerMode::Pomodoro),
            "focus" => Ok(TimerMode::Focus),
            "break" => Ok(TimerMode::Break),
            "custom" => Ok(TimerMode::Custom),
            other => Err(format!(
                "unknown timer mode '{other}' (expected pomodoro, focus, break or custom)"
            )),
        }
    }
}

/// Live state of the engine. Finished sessions leave the engine and are
/// only visible through the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// One timer run from start to stop/reset.
///
/// All timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    pub id: String,
    #[serde(default)]
    pub quest_id: Option<String>,
    pub mode: TimerMode,
    pub duration_minutes: u32,
    pub start_time: u64,
    #[serde(default)]
    pub paused_at: Option<u64>,
    #[serde(default)]
    pub total_paused_duration_ms: u64,
    #[serde(default)]
    pub end_time: Option<u64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl TimerSession {
    pub(crate) fn begin(
        id: String,
        mode: TimerMode,
        duration_minutes: u32,
        quest_id: Option<String>,
        description: Option<String>,
        now: u64,
    ) -> Self {
        Self {
            id,
            quest_id,
            mode,
            duration_minutes,
            start_time: now,
            paused_at: None,
            total_paused_duration_ms: 0,
            end_time: None,
            completed: false,
            description,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_minutes).saturating_mul(60_000)
    }

    /// Active (unpaused) time at `now`.
    ///
    /// The clock is frozen at `paused_at` while paused and at `end_time`
    /// once the session has been stopped.
    pub fn elapsed_ms(&self, now: u64) -> u64 {
        let effective_now = self.end_time.or(self.paused_at).unwrap_or(now);
        effective_now
            .saturating_sub(self.start_time)
            .saturating_sub(self.total_paused_duration_ms)
    }

    pub fn remaining_ms(&self, now: u64) -> u64 {
        self.duration_ms().saturating_sub(self.elapsed_ms(now))
    }

    /// Fraction of the session already spent, in `[0, 1]`.
    pub fn progress(&self, now: u64) -> f64 {
        let total = self.duration_ms();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_ms(now) as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Elapsed time rounded half-up to whole minutes.
    pub fn elapsed_minutes(&self, now: u64) -> u64 {
        (self.elapsed_ms(now) + 30_000) / 60_000
    }

    pub(crate) fn pause(&mut self, now: u64) {
        self.paused_at = Some(now);
    }

    /// Close an open pause gap. Returns the length of the gap.
    pub(crate) fn resume(&mut self, now: u64) -> u64 {
        let gap = self
            .paused_at
            .take()
            .map(|at| now.saturating_sub(at))
            .unwrap_or(0);
        self.total_paused_duration_ms = self.total_paused_duration_ms.saturating_add(gap);
        gap
    }

    pub(crate) fn finish(&mut self, now: u64, completed: bool) {
        self.resume(now);
        self.end_time = Some(now);
        self.completed = completed;
    }
}
