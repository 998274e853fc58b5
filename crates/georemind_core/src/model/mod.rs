//! Domain model for geolocated reminders.
//!
//! # Responsibility
//! - Define canonical data structures shared by store, service and dispatcher.
//!
//! # Invariants
//! - Every reminder is identified by a creator-assigned `ReminderId`.

pub mod reminder;
