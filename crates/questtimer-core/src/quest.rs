//! Quest time-accrual port.
//!
//! Quests are owned elsewhere; the timer only knows their ids. When a session
//! bound to a quest starts, stops or is reset, the engine tells a
//! [`QuestTracker`] so it can open, close or drop a time entry.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub trait QuestTracker: Send + Sync {
    /// Open a time entry for `quest_id`. A quest with an entry already open
    /// keeps that entry.
    fn begin_accrual(&self, quest_id: &str) -> Result<()>;

    /// Close the open entry, crediting `minutes` to the quest.
    fn end_accrual(&self, quest_id: &str, minutes: u64, description: Option<&str>) -> Result<()>;

    /// Drop the open entry without crediting any time.
    fn cancel_accrual(&self, quest_id: &str) -> Result<()>;
}

/// One span of tracked work on a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub quest_id: String,
    /// Epoch milliseconds.
    pub start_time: u64,
    #[serde(default)]
    pub end_time: Option<u64>,
    pub duration_minutes: u64,
    #[serde(default)]
    pub description: Option<String>,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_entry_has_no_end() {
        let entry = TimeEntry {
            id: "e1".into(),
            quest_id: "q1".into(),
            start_time: 0,
            end_time: None,
            duration_minutes: 0,
            description: None,
        };
        assert!(entry.is_open());
    }
}
