use clap::Subcommand;
use questtimer_core::Database;

use crate::context::{print_json, CliResult};

#[derive(Subcommand)]
pub enum QuestAction {
    /// Time entries and total minutes for a quest
    Time {
        /// Quest ID
        id: String,
    },
}

pub fn run(action: QuestAction) -> CliResult {
    let db = Database::open()?;

    match action {
        QuestAction::Time { id } => {
            let entries = db.time_entries(&id)?;
            let total_minutes = db.quest_total_minutes(&id)?;
            print_json(&serde_json::json!({
                "quest_id": id,
                "total_minutes": total_minutes,
                "entries": entries,
            }))?;
        }
    }
    Ok(())
}
