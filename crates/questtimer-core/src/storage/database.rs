//! SQLite-backed adapters.
//!
//! One database file provides every collaborator the timer store needs:
//! - Key-value store for whole-state snapshots
//! - Quest time entries (accrual begin/end/cancel)
//! - Notification inbox

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{data_dir, migrations, KeyValueStore};
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, DatabaseError, Result};
use crate::notify::{NotificationKind, NotificationPriority, NotificationRequest, Notifier};
use crate::quest::{QuestTracker, TimeEntry};

/// A delivered notification as kept in the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub quest_id: Option<String>,
    /// Epoch milliseconds.
    pub created_at: u64,
    #[serde(default)]
    pub read_at: Option<u64>,
}

/// SQLite database shared by the timer store's collaborators.
pub struct Database {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl Database {
    /// Open the database at `<data dir>/questtimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("questtimer.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock: Arc::new(SystemClock),
        })
    }

    /// Use `clock` for entry and notification timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Database(DatabaseError::Locked))
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Time entries ─────────────────────────────────────────────────

    /// All entries for `quest_id`, oldest first.
    pub fn time_entries(&self, quest_id: &str) -> Result<Vec<TimeEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, quest_id, start_time, end_time, duration_minutes, description
             FROM time_entries
             WHERE quest_id = ?1
             ORDER BY start_time, rowid",
        )?;
        let rows = stmt.query_map(params![quest_id], |row| {
            Ok(TimeEntry {
                id: row.get(0)?,
                quest_id: row.get(1)?,
                start_time: row.get::<_, i64>(2)? as u64,
                end_time: row.get::<_, Option<i64>>(3)?.map(|v| v as u64),
                duration_minutes: row.get::<_, i64>(4)? as u64,
                description: row.get(5)?,
            })
        })?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Minutes credited to `quest_id` by closed entries.
    pub fn quest_total_minutes(&self, quest_id: &str) -> Result<u64> {
        let total: i64 = self.conn()?.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0)
             FROM time_entries
             WHERE quest_id = ?1 AND end_time IS NOT NULL",
            params![quest_id],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }

    // ── Notifications ────────────────────────────────────────────────

    /// Store `request` in the inbox and return the stored record.
    pub fn add_notification(&self, request: &NotificationRequest) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: request.kind,
            priority: request.priority,
            title: request.title.clone(),
            message: request.message.clone(),
            quest_id: request.quest_id.clone(),
            created_at: self.clock.now_ms(),
            read_at: None,
        };
        self.conn()?.execute(
            "INSERT INTO notifications (id, kind, priority, title, message, quest_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                notification.id,
                notification.kind.as_str(),
                notification.priority.as_str(),
                notification.title,
                notification.message,
                notification.quest_id,
                notification.created_at as i64,
            ],
        )?;
        Ok(notification)
    }

    /// Newest first.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.query_notifications("")
    }

    pub fn unread_notifications(&self) -> Result<Vec<Notification>> {
        self.query_notifications("WHERE read_at IS NULL")
    }

    pub fn unread_count(&self) -> Result<u64> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM notifications WHERE read_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Returns false if no unread notification has this id.
    pub fn mark_read(&self, id: &str) -> Result<bool> {
        let now = self.clock.now_ms() as i64;
        let changed = self.conn()?.execute(
            "UPDATE notifications SET read_at = ?1 WHERE id = ?2 AND read_at IS NULL",
            params![now, id],
        )?;
        Ok(changed > 0)
    }

    pub fn mark_all_read(&self) -> Result<usize> {
        let now = self.clock.now_ms() as i64;
        let changed = self.conn()?.execute(
            "UPDATE notifications SET read_at = ?1 WHERE read_at IS NULL",
            params![now],
        )?;
        Ok(changed)
    }

    pub fn delete_notification(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM notifications WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn clear_notifications(&self) -> Result<usize> {
        let changed = self.conn()?.execute("DELETE FROM notifications", [])?;
        Ok(changed)
    }

    fn query_notifications(&self, filter: &str) -> Result<Vec<Notification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, kind, priority, title, message, quest_id, created_at, read_at
             FROM notifications {filter}
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, Option<i64>>(7)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, kind, priority, title, message, quest_id, created_at, read_at) = row?;
            let (Some(kind), Some(priority)) = (
                NotificationKind::parse(&kind),
                NotificationPriority::parse(&priority),
            ) else {
                tracing::warn!(%id, %kind, %priority, "skipping notification with unknown kind/priority");
                continue;
            };
            out.push(Notification {
                id,
                kind,
                priority,
                title,
                message,
                quest_id,
                created_at: created_at as u64,
                read_at: read_at.map(|v| v as u64),
            });
        }
        Ok(out)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.kv_get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.kv_set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.kv_remove(key)
    }
}

impl QuestTracker for Database {
    fn begin_accrual(&self, quest_id: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR IGNORE INTO time_entries (id, quest_id, start_time)
             VALUES (?1, ?2, ?3)",
            params![
                Uuid::new_v4().to_string(),
                quest_id,
                self.clock.now_ms() as i64
            ],
        )?;
        Ok(())
    }

    fn end_accrual(&self, quest_id: &str, minutes: u64, description: Option<&str>) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE time_entries
             SET end_time = ?1, duration_minutes = ?2, description = ?3
             WHERE quest_id = ?4 AND end_time IS NULL",
            params![
                self.clock.now_ms() as i64,
                minutes as i64,
                description,
                quest_id
            ],
        )?;
        if changed == 0 {
            tracing::debug!(%quest_id, "no open time entry to close");
        }
        Ok(())
    }

    fn cancel_accrual(&self, quest_id: &str) -> Result<()> {
        self.conn()?.execute(
            "DELETE FROM time_entries WHERE quest_id = ?1 AND end_time IS NULL",
            params![quest_id],
        )?;
        Ok(())
    }
}

impl Notifier for Database {
    fn notify(&self, request: &NotificationRequest) -> Result<()> {
        self.add_notification(request).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn db() -> (Database, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let db = Database::open_memory().unwrap().with_clock(clock.clone());
        (db, clock)
    }

    #[test]
    fn kv_store() {
        let (db, _) = db();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_remove("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn accrual_opens_and_closes_one_entry() {
        let (db, clock) = db();
        db.begin_accrual("q1").unwrap();
        db.begin_accrual("q1").unwrap();
        assert_eq!(db.time_entries("q1").unwrap().len(), 1);
        assert!(db.time_entries("q1").unwrap()[0].is_open());

        clock.advance_min(12);
        db.end_accrual("q1", 12, Some("pomodoro session - 12 minutes"))
            .unwrap();
        let entries = db.time_entries("q1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].duration_minutes, 12);
        assert_eq!(entries[0].end_time, Some(clock.now_ms()));
        assert_eq!(
            entries[0].description.as_deref(),
            Some("pomodoro session - 12 minutes")
        );
        assert_eq!(db.quest_total_minutes("q1").unwrap(), 12);
    }

    #[test]
    fn cancel_removes_only_open_entry() {
        let (db, _) = db();
        db.begin_accrual("q1").unwrap();
        db.end_accrual("q1", 5, None).unwrap();
        db.begin_accrual("q1").unwrap();
        db.cancel_accrual("q1").unwrap();

        let entries = db.time_entries("q1").unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_open());
        assert_eq!(db.quest_total_minutes("q1").unwrap(), 5);
    }

    #[test]
    fn end_without_open_entry_is_noop() {
        let (db, _) = db();
        db.end_accrual("ghost", 3, None).unwrap();
        assert!(db.time_entries("ghost").unwrap().is_empty());
    }

    #[test]
    fn notification_inbox_lifecycle() {
        let (db, clock) = db();
        let first = db
            .add_notification(&NotificationRequest::new(
                NotificationKind::Timer,
                NotificationPriority::Medium,
                "Timer Completed!",
                "done",
            ))
            .unwrap();
        clock.advance_ms(10);
        db.notify(
            &NotificationRequest::new(
                NotificationKind::Focus,
                NotificationPriority::Low,
                "Focus Mode Activated",
                "go",
            )
            .with_quest(Some("q1".into())),
        )
        .unwrap();

        let all = db.notifications().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Focus Mode Activated");
        assert_eq!(all[0].quest_id.as_deref(), Some("q1"));
        assert_eq!(db.unread_count().unwrap(), 2);

        assert!(db.mark_read(&first.id).unwrap());
        assert!(!db.mark_read(&first.id).unwrap());
        assert_eq!(db.unread_notifications().unwrap().len(), 1);

        assert_eq!(db.mark_all_read().unwrap(), 1);
        assert_eq!(db.unread_count().unwrap(), 0);

        assert!(db.delete_notification(&first.id).unwrap());
        assert_eq!(db.clear_notifications().unwrap(), 1);
        assert!(db.notifications().unwrap().is_empty());
    }

    #[test]
    fn open_at_persists_between_handles() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("questtimer.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("timer-state", "{}").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.kv_get("timer-state").unwrap().as_deref(), Some("{}"));
    }
}
