//! Reminder domain model.
//!
//! # Responsibility
//! - Define the durable record persisted by every `ReminderStore`.
//! - Validate identity and coordinate invariants before persistence.
//!
//! # Invariants
//! - `id` is assigned by the creator, never by a store, and never changes.
//! - Stores only require a non-empty `id`; coordinate policy is applied
//!   where reminders are created from user input (`validate_coordinates`).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable reminder identifier.
///
/// Also used verbatim as the geofence request id, so lookups from a fired
/// region resolve against the same key.
pub type ReminderId = String;

/// Validation errors for reminder invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderValidationError {
    EmptyId,
    MissingTitle,
    MissingLocation,
    MissingCoordinates,
    /// Only one of latitude/longitude is set.
    PartialCoordinates,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "reminder id cannot be empty"),
            Self::MissingTitle => write!(f, "reminder title is required"),
            Self::MissingLocation => write!(f, "reminder location is required"),
            Self::MissingCoordinates => {
                write!(f, "reminder latitude and longitude are required")
            }
            Self::PartialCoordinates => {
                write!(f, "latitude and longitude must be set together")
            }
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
        }
    }
}

impl Error for ReminderValidationError {}

/// Durable reminder record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Reminder {
    /// Creates a reminder with a freshly generated UUID v4 id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: Some(title.into()),
            description: Some(description.into()),
            location_name: Some(location_name.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Creates an empty reminder with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: impl Into<ReminderId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            location_name: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Returns `(latitude, longitude)` when the reminder can be geofenced.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Checks the identity invariant every store enforces on write.
    ///
    /// Text and coordinate fields are free-form here.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.id.trim().is_empty() {
            return Err(ReminderValidationError::EmptyId);
        }
        Ok(())
    }

    /// Checks that coordinates are set together and inside WGS84 bounds.
    ///
    /// Absent coordinates are accepted; geofenced drafts require them
    /// separately.
    pub fn validate_coordinates(&self) -> Result<(), ReminderValidationError> {
        match (self.latitude, self.longitude) {
            (None, None) => Ok(()),
            (Some(latitude), Some(longitude)) => {
                if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
                    return Err(ReminderValidationError::LatitudeOutOfRange(latitude));
                }
                if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
                    return Err(ReminderValidationError::LongitudeOutOfRange(longitude));
                }
                Ok(())
            }
            _ => Err(ReminderValidationError::PartialCoordinates),
        }
    }
}
