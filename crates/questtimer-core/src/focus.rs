//! Focus mode: an on/off flag with the quests currently "in focus".
//!
//! Focus mode is independent from the timer engine. UIs usually toggle both
//! together, but nothing here enforces that.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{to_datetime, Clock};
use crate::events::Event;
use crate::notify::{self, NotificationKind, NotificationPriority, NotificationRequest, Notifier};

/// Invariant: `start_time.is_some() == is_active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusMode {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub start_time: Option<u64>,
    #[serde(default)]
    pub quest_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub hide_distractions: bool,
    #[serde(default)]
    pub block_notifications: bool,
    #[serde(default)]
    pub custom_message: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for FocusMode {
    fn default() -> Self {
        Self {
            is_active: false,
            start_time: None,
            quest_ids: Vec::new(),
            hide_distractions: true,
            block_notifications: false,
            custom_message: None,
        }
    }
}

/// Option flags merged over the defaults by `enable`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusOptions {
    #[serde(default)]
    pub hide_distractions: Option<bool>,
    #[serde(default)]
    pub block_notifications: Option<bool>,
    #[serde(default)]
    pub custom_message: Option<String>,
}

/// Shallow update applied by `update`. `custom_message: Some(None)` clears
/// the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusModeUpdate {
    #[serde(default)]
    pub quest_ids: Option<Vec<String>>,
    #[serde(default)]
    pub hide_distractions: Option<bool>,
    #[serde(default)]
    pub block_notifications: Option<bool>,
    #[serde(default)]
    pub custom_message: Option<Option<String>>,
}

pub struct FocusController {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    mode: FocusMode,
}

impl FocusController {
    pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clock,
            notifier,
            mode: FocusMode::default(),
        }
    }

    pub fn mode(&self) -> &FocusMode {
        &self.mode
    }

    pub fn restore(&mut self, mut mode: FocusMode) {
        if mode.is_active != mode.start_time.is_some() {
            tracing::warn!("discarding inconsistent focus mode state");
            mode = FocusMode::default();
        }
        self.mode = mode;
    }

    /// Whole minutes spent in focus so far, 0 when inactive.
    pub fn elapsed_minutes(&self) -> u64 {
        match self.mode.start_time {
            Some(start) => (self.clock.now_ms().saturating_sub(start) + 30_000) / 60_000,
            None => 0,
        }
    }

    pub fn enable(&mut self, quest_ids: Vec<String>, options: FocusOptions) -> Event {
        let now = self.clock.now_ms();
        let defaults = FocusMode::default();
        self.mode = FocusMode {
            is_active: true,
            start_time: Some(now),
            quest_ids,
            hide_distractions: options.hide_distractions.unwrap_or(defaults.hide_distractions),
            block_notifications: options
                .block_notifications
                .unwrap_or(defaults.block_notifications),
            custom_message: options.custom_message,
        };
        tracing::debug!(quests = self.mode.quest_ids.len(), "focus mode enabled");

        let message = if self.mode.quest_ids.is_empty() {
            "Focus mode enabled. Minimize distractions and stay productive!".to_string()
        } else {
            format!(
                "Focus mode enabled for {} quest(s). Stay focused!",
                self.mode.quest_ids.len()
            )
        };
        notify::dispatch(
            self.notifier.as_ref(),
            NotificationRequest::new(
                NotificationKind::Focus,
                NotificationPriority::Low,
                "Focus Mode Activated",
                message,
            ),
        );

        Event::FocusEnabled {
            quest_ids: self.mode.quest_ids.clone(),
            at: to_datetime(now),
        }
    }

    /// Turn focus mode off. Returns `None` if it was not on.
    pub fn disable(&mut self) -> Option<Event> {
        let was_active = self.mode.is_active;
        let duration_minutes = self.elapsed_minutes();
        self.mode = FocusMode::default();
        if !was_active {
            return None;
        }
        tracing::debug!(duration_minutes, "focus mode disabled");

        if duration_minutes > 0 {
            notify::dispatch(
                self.notifier.as_ref(),
                NotificationRequest::new(
                    NotificationKind::Focus,
                    NotificationPriority::Low,
                    "Focus Session Complete",
                    format!("Great job! You stayed focused for {duration_minutes} minutes."),
                ),
            );
        }
        Some(Event::FocusDisabled {
            duration_minutes,
            at: to_datetime(self.clock.now_ms()),
        })
    }

    /// Merge `update` without touching `is_active`/`start_time`.
    pub fn update(&mut self, update: FocusModeUpdate) -> &FocusMode {
        if let Some(ids) = update.quest_ids {
            self.mode.quest_ids = ids;
        }
        if let Some(v) = update.hide_distractions {
            self.mode.hide_distractions = v;
        }
        if let Some(v) = update.block_notifications {
            self.mode.block_notifications = v;
        }
        if let Some(msg) = update.custom_message {
            self.mode.custom_message = msg;
        }
        &self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Result;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Inbox(Mutex<Vec<NotificationRequest>>);

    impl Notifier for Inbox {
        fn notify(&self, request: &NotificationRequest) -> Result<()> {
            self.0.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn controller() -> (FocusController, Arc<ManualClock>, Arc<Inbox>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let inbox = Arc::new(Inbox::default());
        (FocusController::new(clock.clone(), inbox.clone()), clock, inbox)
    }

    #[test]
    fn enable_sets_quests_and_start_time() {
        let (mut focus, clock, inbox) = controller();
        focus.enable(vec!["q1".into(), "q2".into()], FocusOptions::default());

        let mode = focus.mode();
        assert!(mode.is_active);
        assert_eq!(mode.start_time, Some(clock.now_ms()));
        assert_eq!(mode.quest_ids, vec!["q1", "q2"]);
        assert!(mode.hide_distractions);

        let sent = inbox.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Focus);
        assert_eq!(sent[0].priority, NotificationPriority::Low);
        assert!(sent[0].message.contains("2 quest(s)"));
    }

    #[test]
    fn enable_merges_options() {
        let (mut focus, _, _) = controller();
        focus.enable(
            vec![],
            FocusOptions {
                hide_distractions: Some(false),
                block_notifications: Some(true),
                custom_message: Some("Ship it".into()),
            },
        );
        let mode = focus.mode();
        assert!(!mode.hide_distractions);
        assert!(mode.block_notifications);
        assert_eq!(mode.custom_message.as_deref(), Some("Ship it"));
    }

    #[test]
    fn disable_reports_duration() {
        let (mut focus, clock, inbox) = controller();
        focus.enable(vec!["q1".into(), "q2".into()], FocusOptions::default());
        clock.advance_min(5);

        let event = focus.disable().unwrap();
        assert_eq!(
            event,
            Event::FocusDisabled {
                duration_minutes: 5,
                at: to_datetime(clock.now_ms()),
            }
        );
        assert_eq!(*focus.mode(), FocusMode::default());

        let sent = inbox.0.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].title, "Focus Session Complete");
        assert!(sent[1].message.contains('5'));
    }

    #[test]
    fn short_focus_sends_no_completion_notice() {
        let (mut focus, clock, inbox) = controller();
        focus.enable(vec![], FocusOptions::default());
        clock.advance_ms(20_000);
        focus.disable();
        assert_eq!(inbox.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn disable_when_inactive_is_noop() {
        let (mut focus, _, inbox) = controller();
        assert!(focus.disable().is_none());
        assert!(inbox.0.lock().unwrap().is_empty());
    }

    #[test]
    fn update_keeps_activation_fields() {
        let (mut focus, clock, _) = controller();
        focus.enable(vec!["q1".into()], FocusOptions::default());
        let started = clock.now_ms();
        clock.advance_min(1);

        focus.update(FocusModeUpdate {
            quest_ids: Some(vec!["q3".into()]),
            custom_message: Some(Some("Deep work".into())),
            ..Default::default()
        });
        let mode = focus.mode();
        assert!(mode.is_active);
        assert_eq!(mode.start_time, Some(started));
        assert_eq!(mode.quest_ids, vec!["q3"]);
        assert_eq!(mode.custom_message.as_deref(), Some("Deep work"));

        focus.update(FocusModeUpdate {
            custom_message: Some(None),
            ..Default::default()
        });
        assert!(focus.mode().custom_message.is_none());
    }

    #[test]
    fn restore_rejects_inconsistent_state() {
        let (mut focus, _, _) = controller();
        focus.restore(FocusMode {
            is_active: true,
            start_time: None,
            ..Default::default()
        });
        assert!(!focus.mode().is_active);
    }
}
