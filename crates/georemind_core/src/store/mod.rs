//! Reminder store contracts.
//!
//! # Responsibility
//! - Define the keyed reminder storage contract shared by the dispatcher,
//!   the service layer and test fixtures.
//! - Carry a single two-way outcome type (`StoreResult`) across task
//!   boundaries instead of panicking.
//!
//! # Invariants
//! - An id maps to at most one stored reminder; saving a reused id overwrites.
//! - Each operation is atomic with respect to the others.
//! - Absence is `StoreError::NotFound`, never a panic.

pub mod fixture;
pub mod sqlite_store;

use crate::db::DbError;
use crate::model::reminder::{Reminder, ReminderId, ReminderValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use fixture::FixtureReminderStore;
pub use sqlite_store::SqliteReminderStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure side of every store lookup or write.
#[derive(Debug)]
pub enum StoreError {
    NotFound(ReminderId),
    Validation(ReminderValidationError),
    Db(DbError),
    InvalidData(String),
    /// Failure forced by a test fixture.
    Injected(String),
}

impl StoreError {
    /// Human-readable message for logs and collaborators.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Backend result code, when the failure originated in SQLite.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Db(err) => err.sqlite_code(),
            _ => None,
        }
    }

    /// Stable label used as `error_code=` in log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "reminder_not_found",
            Self::Validation(_) => "reminder_invalid",
            Self::Db(_) => "store_backend_error",
            Self::InvalidData(_) => "store_corrupt_row",
            Self::Injected(_) => "store_injected_error",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the failure points at the storage backend itself rather than
    /// at one record, i.e. something operators need to look at.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Db(_) | Self::InvalidData(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Reminder not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted reminder data: {message}"),
            Self::Injected(message) => write!(f, "{message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Injected(_) => None,
        }
    }
}

impl From<ReminderValidationError> for StoreError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Keyed reminder storage.
///
/// Implementations are shared across dispatcher tasks, hence `Send + Sync`.
/// Calls may block on I/O; async callers offload them to a blocking pool.
pub trait ReminderStore: Send + Sync {
    /// Returns every stored reminder in unspecified order.
    fn get_reminders(&self) -> StoreResult<Vec<Reminder>>;
    /// Inserts or overwrites the reminder keyed by `reminder.id`.
    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()>;
    fn get_reminder(&self, id: &str) -> StoreResult<Reminder>;
    /// Removes all reminders. Clearing an empty store succeeds.
    fn delete_all_reminders(&self) -> StoreResult<()>;
}

impl<S: ReminderStore + ?Sized> ReminderStore for std::sync::Arc<S> {
    fn get_reminders(&self) -> StoreResult<Vec<Reminder>> {
        (**self).get_reminders()
    }

    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        (**self).save_reminder(reminder)
    }

    fn get_reminder(&self, id: &str) -> StoreResult<Reminder> {
        (**self).get_reminder(id)
    }

    fn delete_all_reminders(&self) -> StoreResult<()> {
        (**self).delete_all_reminders()
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::db::DbError;

    #[test]
    fn not_found_message_and_labels() {
        let err = StoreError::NotFound("abc".to_string());
        assert!(err.message().starts_with("Reminder not found"));
        assert_eq!(err.code(), None);
        assert!(err.is_not_found());
        assert!(!err.is_backend());
        assert_eq!(err.error_code(), "reminder_not_found");
    }

    #[test]
    fn backend_error_exposes_sqlite_code() {
        let sqlite = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
            Some("disk I/O error".to_string()),
        );
        let err = StoreError::Db(DbError::Sqlite(sqlite));
        assert_eq!(err.code(), Some(rusqlite::ffi::SQLITE_IOERR));
        assert!(err.is_backend());
    }
}
