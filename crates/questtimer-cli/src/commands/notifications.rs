use clap::Subcommand;
use questtimer_core::Database;

use crate::context::{print_json, CliResult};

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark every notification as read
    ReadAll,
    /// Delete one notification
    Delete {
        /// Notification ID
        id: String,
    },
    /// Delete every notification
    Clear,
}

pub fn run(action: NotificationsAction) -> CliResult {
    let db = Database::open()?;

    match action {
        NotificationsAction::List { unread } => {
            let list = if unread {
                db.unread_notifications()?
            } else {
                db.notifications()?
            };
            print_json(&list)?;
        }
        NotificationsAction::Read { id } => {
            if !db.mark_read(&id)? {
                return Err(format!("no unread notification with id {id}").into());
            }
            println!("ok");
        }
        NotificationsAction::ReadAll => {
            let count = db.mark_all_read()?;
            println!("marked {count} notification(s) as read");
        }
        NotificationsAction::Delete { id } => {
            if !db.delete_notification(&id)? {
                return Err(format!("no notification with id {id}").into());
            }
            println!("ok");
        }
        NotificationsAction::Clear => {
            let count = db.clear_notifications()?;
            println!("deleted {count} notification(s)");
        }
    }
    Ok(())
}
