mod engine;
mod format;
mod session;
mod settings;

pub use engine::{EngineOptions, StartPolicy, TimerEngine, TimerEngineState};
pub use format::format_time;
pub use session::{TimerMode, TimerSession, TimerState};
pub use settings::{TimerSettings, TimerSettingsPatch};
