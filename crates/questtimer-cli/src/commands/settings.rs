use clap::Subcommand;
use questtimer_core::{Config, TimerSettingsPatch};

use crate::context::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print timer settings as JSON
    Show,
    /// Change one setting
    Set {
        /// Setting name (e.g. "pomodoro_duration", "auto_start_breaks")
        key: String,
        /// New value
        value: String,
    },
    /// Restore the default settings
    Reset,
}

pub fn run(action: SettingsAction, config: &Config) -> CliResult {
    let (mut store, _db) = open_store(config)?;

    match action {
        SettingsAction::Show => print_json(store.settings())?,
        SettingsAction::Set { key, value } => {
            let patch = TimerSettingsPatch::parse_assignment(&key, &value)?;
            let settings = store.update_settings(&patch)?;
            print_json(settings)?;
        }
        SettingsAction::Reset => {
            let settings = store.reset_settings();
            print_json(settings)?;
        }
    }
    Ok(())
}
