//! Notification port.
//!
//! The engine and focus mode emit [`NotificationRequest`]s after their state
//! transitions commit. Delivery is best-effort: a failing [`Notifier`] is
//! logged by the caller and otherwise ignored.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Timer,
    Focus,
    DueSoon,
    Overdue,
    Achievement,
    Streak,
    Recurring,
    Completion,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Timer => "timer",
            NotificationKind::Focus => "focus",
            NotificationKind::DueSoon => "due_soon",
            NotificationKind::Overdue => "overdue",
            NotificationKind::Achievement => "achievement",
            NotificationKind::Streak => "streak",
            NotificationKind::Recurring => "recurring",
            NotificationKind::Completion => "completion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "timer" => NotificationKind::Timer,
            "focus" => NotificationKind::Focus,
            "due_soon" => NotificationKind::DueSoon,
            "overdue" => NotificationKind::Overdue,
            "achievement" => NotificationKind::Achievement,
            "streak" => NotificationKind::Streak,
            "recurring" => NotificationKind::Recurring,
            "completion" => NotificationKind::Completion,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl NotificationPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Medium => "medium",
            NotificationPriority::High => "high",
            NotificationPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "low" => NotificationPriority::Low,
            "medium" => NotificationPriority::Medium,
            "high" => NotificationPriority::High,
            "urgent" => NotificationPriority::Urgent,
            _ => return None,
        })
    }
}

/// What the engine asks a notifier to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub quest_id: Option<String>,
}

impl NotificationRequest {
    pub fn new(
        kind: NotificationKind,
        priority: NotificationPriority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            title: title.into(),
            message: message.into(),
            quest_id: None,
        }
    }

    pub fn with_quest(mut self, quest_id: Option<String>) -> Self {
        self.quest_id = quest_id;
        self
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, request: &NotificationRequest) -> Result<()>;
}

/// Dispatch `request`, logging instead of propagating a failure.
pub(crate) fn dispatch(notifier: &dyn Notifier, request: NotificationRequest) {
    if let Err(e) = notifier.notify(&request) {
        tracing::warn!(title = %request.title, error = %e, "notification dispatch failed");
    }
}
