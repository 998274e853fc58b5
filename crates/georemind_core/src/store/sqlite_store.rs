//! SQLite-backed reminder store.
//!
//! # Responsibility
//! - Persist reminders in the `reminders` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Reminder::validate()` before SQL mutations, the same
//!   id-only rule every `ReminderStore` applies.
//! - Read paths reject rows whose columns do not decode (wrong storage
//!   class, blank id) instead of masking them.
//! - One connection guarded by a mutex: every call sees a complete row.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::reminder::Reminder;
use crate::store::{ReminderStore, StoreError, StoreResult};
use log::{debug, error};
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    location_name,
    latitude,
    longitude
FROM reminders";

/// Durable reminder store over a single SQLite connection.
pub struct SqliteReminderStore {
    conn: Mutex<Connection>,
}

impl SqliteReminderStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the guard cannot leave a half-applied
        // statement behind; SQLite rolls it back.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReminderStore for SqliteReminderStore {
    fn get_reminders(&self) -> StoreResult<Vec<Reminder>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(REMINDER_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();

        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }

        debug!(
            "event=reminder_list module=store status=ok count={}",
            reminders.len()
        );
        Ok(reminders)
    }

    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        reminder.validate()?;

        let result = self.conn().execute(
            "INSERT INTO reminders (
                id,
                title,
                description,
                location_name,
                latitude,
                longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                location_name = excluded.location_name,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                reminder.id.as_str(),
                reminder.title.as_deref(),
                reminder.description.as_deref(),
                reminder.location_name.as_deref(),
                reminder.latitude,
                reminder.longitude,
            ],
        );

        if let Err(err) = result {
            let err = StoreError::from(err);
            error!(
                "event=reminder_save module=store status=error reminder_id={} error_code={} sqlite_code={:?} error={}",
                reminder.id,
                err.error_code(),
                err.code(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=reminder_save module=store status=ok reminder_id={}",
            reminder.id
        );
        Ok(())
    }

    fn get_reminder(&self, id: &str) -> StoreResult<Reminder> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        let reminder = stmt
            .query_row([id], |row| Ok(parse_reminder_row(row)))
            .optional()?;

        match reminder {
            Some(parsed) => parsed,
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn delete_all_reminders(&self) -> StoreResult<()> {
        let removed = self.conn().execute("DELETE FROM reminders;", [])?;
        debug!("event=reminder_clear module=store status=ok removed={removed}");
        Ok(())
    }
}

fn parse_reminder_row(row: &Row<'_>) -> StoreResult<Reminder> {
    let reminder = Reminder {
        id: column(row, "id")?,
        title: column(row, "title")?,
        description: column(row, "description")?,
        location_name: column(row, "location_name")?,
        latitude: column(row, "latitude")?,
        longitude: column(row, "longitude")?,
    };

    reminder.validate().map_err(|err| {
        StoreError::InvalidData(format!("row `{}` violates reminder invariants: {err}", reminder.id))
    })?;
    Ok(reminder)
}

/// Reads one column, reporting undecodable values as corrupt data.
fn column<T: FromSql>(row: &Row<'_>, name: &str) -> StoreResult<T> {
    row.get(name).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => {
            StoreError::InvalidData(format!("column `{name}` does not decode: {err}"))
        }
        other => StoreError::from(other),
    })
}

#[cfg(test)]
mod tests {
    use super::SqliteReminderStore;
    use crate::model::reminder::Reminder;
    use crate::store::{ReminderStore, StoreError};

    #[test]
    fn corrupt_row_is_reported_as_invalid_data() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO reminders (id, latitude, longitude) VALUES ('bad', 'north', 0.0);",
                [],
            )
            .unwrap();

        let err = store.get_reminder("bad").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert_eq!(err.error_code(), "store_corrupt_row");
        assert!(err.is_backend());
        assert!(matches!(store.get_reminders(), Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn blank_id_is_rejected_before_write() {
        let store = SqliteReminderStore::open_in_memory().unwrap();

        let err = store.save_reminder(&Reminder::with_id(" ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.get_reminders().unwrap().is_empty());
    }

    #[test]
    fn half_set_coordinates_are_stored_as_given() {
        let store = SqliteReminderStore::open_in_memory().unwrap();
        let mut reminder = Reminder::with_id("half");
        reminder.latitude = Some(1.0);

        store.save_reminder(&reminder).unwrap();
        assert_eq!(store.get_reminder("half").unwrap(), reminder);
    }
}
