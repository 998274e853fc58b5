//! In-memory reminder store with failure injection.
//!
//! Lets dispatcher failure tolerance be exercised without a backing
//! database. Not meant for production wiring.
//!
//! # Invariants
//! - With error mode on, `get_reminder` fails for *every* id, including ids
//!   that are present.
//! - `save_reminder` and `delete_all_reminders` ignore error mode so tests
//!   can arrange state while failures are enabled.
//! - `save_reminder` applies the same id-only validation as the SQLite
//!   store.

use crate::model::reminder::{Reminder, ReminderId};
use crate::store::{ReminderStore, StoreError, StoreResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

const LIST_ERROR_MESSAGE: &str = "Error getting reminders";
const LOOKUP_ERROR_MESSAGE: &str = "fixture store error";

#[derive(Default)]
pub struct FixtureReminderStore {
    reminders: RwLock<Vec<Reminder>>,
    return_error: AtomicBool,
    failing_ids: RwLock<HashSet<ReminderId>>,
}

impl FixtureReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store. An absent list behaves exactly like an empty one.
    pub fn with_reminders(reminders: Option<Vec<Reminder>>) -> Self {
        Self {
            reminders: RwLock::new(reminders.unwrap_or_default()),
            ..Self::default()
        }
    }

    /// Toggles whole-store error mode.
    pub fn set_return_error(&self, value: bool) {
        self.return_error.store(value, Ordering::SeqCst);
    }

    /// Forces lookups of one id to fail even when error mode is off.
    pub fn fail_lookup_for(&self, id: impl Into<ReminderId>) {
        self.failing_ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into());
    }

    /// Number of stored records; saves upsert, so each id counts once.
    pub fn len(&self) -> usize {
        self.reminders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn in_error_mode(&self) -> bool {
        self.return_error.load(Ordering::SeqCst)
    }

    fn lookup_forced_to_fail(&self, id: &str) -> bool {
        self.failing_ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

impl From<Option<Vec<Reminder>>> for FixtureReminderStore {
    fn from(value: Option<Vec<Reminder>>) -> Self {
        Self::with_reminders(value)
    }
}

impl ReminderStore for FixtureReminderStore {
    fn get_reminders(&self) -> StoreResult<Vec<Reminder>> {
        if self.in_error_mode() {
            return Err(StoreError::Injected(LIST_ERROR_MESSAGE.to_string()));
        }

        Ok(self
            .reminders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        reminder.validate()?;

        let mut reminders = self
            .reminders
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match reminders.iter_mut().find(|stored| stored.id == reminder.id) {
            Some(stored) => *stored = reminder.clone(),
            None => reminders.push(reminder.clone()),
        }
        Ok(())
    }

    fn get_reminder(&self, id: &str) -> StoreResult<Reminder> {
        if self.in_error_mode() || self.lookup_forced_to_fail(id) {
            return Err(StoreError::Injected(LOOKUP_ERROR_MESSAGE.to_string()));
        }

        self.reminders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|stored| stored.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete_all_reminders(&self) -> StoreResult<()> {
        self.reminders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
