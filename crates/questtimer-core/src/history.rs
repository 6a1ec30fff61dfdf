//! Append-only log of finished timer sessions.

use serde::{Deserialize, Serialize};

use crate::clock::to_datetime;
use crate::timer::{TimerMode, TimerSession};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHistory {
    sessions: Vec<TimerSession>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub completed_pomodoros: u64,
    pub total_focus_minutes: u64,
    pub today_sessions: u64,
    pub today_focus_minutes: u64,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, session: TimerSession) {
        self.sessions.push(session);
    }

    pub fn sessions(&self) -> &[TimerSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn completed_pomodoros(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.completed && s.mode == TimerMode::Pomodoro)
            .count()
    }

    /// Aggregate the log. "Today" is the UTC calendar day containing `now`.
    pub fn stats(&self, now: u64) -> HistoryStats {
        let today = to_datetime(now).date_naive();
        let mut stats = HistoryStats::default();

        for session in &self.sessions {
            let minutes = session.elapsed_minutes(now);
            let is_today = to_datetime(session.start_time).date_naive() == today;

            stats.total_sessions += 1;
            if session.completed {
                stats.completed_sessions += 1;
                if session.mode == TimerMode::Pomodoro {
                    stats.completed_pomodoros += 1;
                }
            }
            if session.mode.is_work() {
                stats.total_focus_minutes += minutes;
                if is_today {
                    stats.today_focus_minutes += minutes;
                }
            }
            if is_today {
                stats.today_sessions += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: u64 = 86_400_000;

    fn finished(mode: TimerMode, start: u64, minutes: u64, completed: bool) -> TimerSession {
        let mut s = TimerSession::begin(format!("s{start}"), mode, 25, None, None, start);
        s.finish(start + minutes * 60_000, completed);
        s
    }

    #[test]
    fn stats_split_today_from_earlier_days() {
        let now = 20 * DAY_MS + 12 * 3_600_000;
        let mut history = SessionHistory::new();
        history.push(finished(TimerMode::Pomodoro, now - DAY_MS, 25, true));
        history.push(finished(TimerMode::Pomodoro, now - 3_600_000, 25, true));
        history.push(finished(TimerMode::Break, now - 1_800_000, 5, true));
        history.push(finished(TimerMode::Focus, now - 600_000, 8, false));

        let stats = history.stats(now);
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.completed_sessions, 3);
        assert_eq!(stats.completed_pomodoros, 2);
        assert_eq!(stats.total_focus_minutes, 58);
        assert_eq!(stats.today_sessions, 3);
        assert_eq!(stats.today_focus_minutes, 33);
        assert_eq!(history.completed_pomodoros(), 2);
    }

    #[test]
    fn clear_empties_log() {
        let mut history = SessionHistory::new();
        history.push(finished(TimerMode::Custom, 0, 1, false));
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
    }
}
