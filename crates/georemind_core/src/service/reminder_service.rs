//! Reminder use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for collaborators that build reminders from
//!   user input.
//! - Delegate persistence to any `ReminderStore` implementation.
//!
//! # Invariants
//! - Drafts are validated (title, location, coordinates) before an id is
//!   generated or anything is written. Coordinate range and pairing are
//!   enforced here, not by stores.
//! - Service layer remains storage-agnostic.

use crate::model::reminder::{Reminder, ReminderValidationError};
use crate::store::{ReminderStore, StoreResult};
use log::info;

/// User-entered reminder data prior to persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ReminderDraft {
    /// Checks the fields a geofenced reminder cannot do without.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if is_blank(self.title.as_deref()) {
            return Err(ReminderValidationError::MissingTitle);
        }
        if is_blank(self.location_name.as_deref()) {
            return Err(ReminderValidationError::MissingLocation);
        }
        if self.latitude.is_none() && self.longitude.is_none() {
            return Err(ReminderValidationError::MissingCoordinates);
        }
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}

/// Use-case service wrapper for reminder persistence.
pub struct ReminderService<S: ReminderStore> {
    store: S,
}

impl<S: ReminderStore> ReminderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying store, e.g. to share it with a dispatcher.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates a draft, assigns a fresh id and persists it.
    ///
    /// # Contract
    /// - Returns the stored reminder; its `id` is what the caller registers
    ///   as the geofence request id.
    pub fn create_reminder(&self, draft: ReminderDraft) -> StoreResult<Reminder> {
        draft.validate()?;

        let mut reminder = Reminder::with_id(uuid::Uuid::new_v4().to_string());
        reminder.title = draft.title;
        reminder.description = draft.description;
        reminder.location_name = draft.location_name;
        reminder.latitude = draft.latitude;
        reminder.longitude = draft.longitude;
        reminder.validate()?;
        reminder.validate_coordinates()?;

        self.store.save_reminder(&reminder)?;
        info!(
            "event=reminder_create module=service status=ok reminder_id={}",
            reminder.id
        );
        Ok(reminder)
    }

    pub fn save_reminder(&self, reminder: &Reminder) -> StoreResult<()> {
        self.store.save_reminder(reminder)
    }

    pub fn get_reminder(&self, id: &str) -> StoreResult<Reminder> {
        self.store.get_reminder(id)
    }

    pub fn list_reminders(&self) -> StoreResult<Vec<Reminder>> {
        self.store.get_reminders()
    }

    pub fn delete_all_reminders(&self) -> StoreResult<()> {
        self.store.delete_all_reminders()?;
        info!("event=reminder_clear module=service status=ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ReminderDraft, ReminderService};
    use crate::model::reminder::ReminderValidationError;
    use crate::store::{FixtureReminderStore, StoreError};

    fn draft() -> ReminderDraft {
        ReminderDraft {
            title: Some("Library Visit".to_string()),
            description: Some("Borrow some books".to_string()),
            location_name: Some("Central Library".to_string()),
            latitude: Some(6.55555),
            longitude: Some(7.56565),
        }
    }

    #[test]
    fn create_reminder_assigns_id_and_persists() {
        let service = ReminderService::new(FixtureReminderStore::new());
        let created = service.create_reminder(draft()).unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(service.get_reminder(&created.id).unwrap(), created);
    }

    #[test]
    fn create_reminder_requires_title_and_location() {
        let service = ReminderService::new(FixtureReminderStore::new());

        let mut missing_title = draft();
        missing_title.title = Some("  ".to_string());
        assert!(matches!(
            service.create_reminder(missing_title),
            Err(StoreError::Validation(ReminderValidationError::MissingTitle))
        ));

        let mut missing_location = draft();
        missing_location.location_name = None;
        assert!(matches!(
            service.create_reminder(missing_location),
            Err(StoreError::Validation(ReminderValidationError::MissingLocation))
        ));

        assert!(service.list_reminders().unwrap().is_empty());
    }

    #[test]
    fn create_reminder_requires_coordinates() {
        let service = ReminderService::new(FixtureReminderStore::new());
        let mut no_coordinates = draft();
        no_coordinates.latitude = None;
        no_coordinates.longitude = None;

        assert!(matches!(
            service.create_reminder(no_coordinates),
            Err(StoreError::Validation(
                ReminderValidationError::MissingCoordinates
            ))
        ));
    }

    #[test]
    fn create_reminder_rejects_half_set_and_out_of_range_coordinates() {
        let service = ReminderService::new(FixtureReminderStore::new());

        let mut latitude_only = draft();
        latitude_only.longitude = None;
        assert!(matches!(
            service.create_reminder(latitude_only),
            Err(StoreError::Validation(
                ReminderValidationError::PartialCoordinates
            ))
        ));

        let mut out_of_range = draft();
        out_of_range.latitude = Some(95.0);
        assert!(matches!(
            service.create_reminder(out_of_range),
            Err(StoreError::Validation(
                ReminderValidationError::LatitudeOutOfRange(_)
            ))
        ));

        assert!(service.list_reminders().unwrap().is_empty());
    }
}
