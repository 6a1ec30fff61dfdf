//! Wires the SQLite adapters into a [`TimerStore`].

use std::sync::Arc;

use questtimer_core::{Collaborators, Config, Database, SystemClock, TimerStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the database and a store whose collaborators all live in it.
pub fn open_store(config: &Config) -> Result<(TimerStore, Arc<Database>), Box<dyn std::error::Error>> {
    let db = Arc::new(Database::open()?);
    let store = TimerStore::open(
        Collaborators {
            clock: Arc::new(SystemClock),
            quests: db.clone(),
            notifier: db.clone(),
            storage: db.clone(),
        },
        config.timer.clone(),
    )?;
    Ok((store, db))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
