use clap::Subcommand;
use questtimer_core::{Config, FocusModeUpdate, FocusOptions};

use crate::context::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum FocusAction {
    /// Turn focus mode on
    On {
        /// Quests in focus
        quests: Vec<String>,
        /// Message shown while focusing
        #[arg(long)]
        message: Option<String>,
        /// Keep distractions visible
        #[arg(long)]
        no_hide_distractions: bool,
        /// Hold back notifications while focusing
        #[arg(long)]
        block_notifications: bool,
    },
    /// Turn focus mode off
    Off,
    /// Change or clear the focus message
    Message {
        /// New message; omit to clear
        message: Option<String>,
    },
    /// Print focus mode as JSON
    Status,
}

pub fn run(action: FocusAction, config: &Config) -> CliResult {
    let (mut store, _db) = open_store(config)?;

    match action {
        FocusAction::On {
            quests,
            message,
            no_hide_distractions,
            block_notifications,
        } => {
            let options = FocusOptions {
                hide_distractions: Some(!no_hide_distractions),
                block_notifications: Some(block_notifications),
                custom_message: message,
            };
            let event = store.enable_focus_mode(quests, options);
            print_json(&event)?;
        }
        FocusAction::Off => match store.disable_focus_mode() {
            Some(event) => print_json(&event)?,
            None => print_json(store.focus_mode())?,
        },
        FocusAction::Message { message } => {
            let mode = store.update_focus_mode(FocusModeUpdate {
                custom_message: Some(message),
                ..Default::default()
            });
            print_json(mode)?;
        }
        FocusAction::Status => print_json(store.focus_mode())?,
    }
    Ok(())
}
