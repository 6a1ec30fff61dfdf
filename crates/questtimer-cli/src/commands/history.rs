use chrono::Local;
use clap::Subcommand;
use questtimer_core::clock::to_datetime;
use questtimer_core::Config;

use crate::context::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List finished sessions, oldest first
    List {
        /// Print the raw sessions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals over the whole history and today
    Stats,
    /// Forget all finished sessions
    Clear,
}

pub fn run(action: HistoryAction, config: &Config) -> CliResult {
    let (mut store, _db) = open_store(config)?;

    match action {
        HistoryAction::List { json } => {
            let sessions = store.get_session_history();
            if json {
                print_json(&sessions)?;
                return Ok(());
            }
            if sessions.is_empty() {
                println!("no sessions yet");
            }
            for session in sessions {
                let started = to_datetime(session.start_time).with_timezone(&Local);
                let minutes = session.elapsed_minutes(session.end_time.unwrap_or(session.start_time));
                println!(
                    "{}  {:<8}  {:>3}/{:<3} min  {}{}",
                    started.format("%Y-%m-%d %H:%M"),
                    session.mode,
                    minutes,
                    session.duration_minutes,
                    if session.completed { "completed" } else { "stopped" },
                    session
                        .quest_id
                        .as_deref()
                        .map(|q| format!("  quest={q}"))
                        .unwrap_or_default(),
                );
            }
        }
        HistoryAction::Stats => print_json(&store.history_stats())?,
        HistoryAction::Clear => {
            store.clear_session_history();
            println!("history cleared");
        }
    }
    Ok(())
}
