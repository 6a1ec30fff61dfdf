use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// User-tunable timer settings. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_pomodoro")]
    pub pomodoro_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    /// Completed pomodoros between long breaks.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
    #[serde(default = "default_true")]
    pub show_notifications: bool,
}

fn default_pomodoro() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            pomodoro_duration: default_pomodoro(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
            vibration_enabled: true,
            show_notifications: true,
        }
    }
}

impl TimerSettings {
    /// Break length to take once `completed_pomodoros` pomodoros are done.
    pub fn break_after(&self, completed_pomodoros: usize) -> u32 {
        let interval = self.long_break_interval.max(1) as usize;
        if completed_pomodoros > 0 && completed_pomodoros % interval == 0 {
            self.long_break_duration
        } else {
            self.short_break_duration
        }
    }

    /// Apply `patch` on a copy and return it if the result is valid.
    pub fn merged(&self, patch: &TimerSettingsPatch) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, minutes) in [
            ("pomodoro_duration", self.pomodoro_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("long_break_interval", self.long_break_interval),
        ] {
            if minutes == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}

/// Partial update for [`TimerSettings`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_breaks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_pomodoros: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_notifications: Option<bool>,
}

impl TimerSettingsPatch {
    /// Build a single-field patch from a `key = value` assignment.
    pub fn parse_assignment(key: &str, value: &str) -> Result<Self, ValidationError> {
        let minutes = || {
            value
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(key, format!("cannot parse '{value}' as minutes")))
        };
        let flag = || {
            value
                .trim()
                .parse::<bool>()
                .map_err(|_| invalid(key, format!("cannot parse '{value}' as true/false")))
        };

        let mut patch = Self::default();
        match key {
            "pomodoro_duration" => patch.pomodoro_duration = Some(minutes()?),
            "short_break_duration" => patch.short_break_duration = Some(minutes()?),
            "long_break_duration" => patch.long_break_duration = Some(minutes()?),
            "long_break_interval" => patch.long_break_interval = Some(minutes()?),
            "auto_start_breaks" => patch.auto_start_breaks = Some(flag()?),
            "auto_start_pomodoros" => patch.auto_start_pomodoros = Some(flag()?),
            "sound_enabled" => patch.sound_enabled = Some(flag()?),
            "vibration_enabled" => patch.vibration_enabled = Some(flag()?),
            "show_notifications" => patch.show_notifications = Some(flag()?),
            _ => return Err(invalid(key, "unknown setting".into())),
        }
        Ok(patch)
    }

    fn apply_to(&self, s: &mut TimerSettings) {
        if let Some(v) = self.pomodoro_duration {
            s.pomodoro_duration = v;
        }
        if let Some(v) = self.short_break_duration {
            s.short_break_duration = v;
        }
        if let Some(v) = self.long_break_duration {
            s.long_break_duration = v;
        }
        if let Some(v) = self.long_break_interval {
            s.long_break_interval = v;
        }
        if let Some(v) = self.auto_start_breaks {
            s.auto_start_breaks = v;
        }
        if let Some(v) = self.auto_start_pomodoros {
            s.auto_start_pomodoros = v;
        }
        if let Some(v) = self.sound_enabled {
            s.sound_enabled = v;
        }
        if let Some(v) = self.vibration_enabled {
            s.vibration_enabled = v;
        }
        if let Some(v) = self.show_notifications {
            s.show_notifications = v;
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message,
    }
}
