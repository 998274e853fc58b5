//! Geofence transition handling.
//!
//! # Responsibility
//! - Model inbound transition events from the location monitor.
//! - Resolve fired regions to reminders and hand them to a `Notifier`.
//!
//! Registration of regions is owned by the caller; the only assumption is
//! that each region was registered with the reminder id as request id.

pub mod dispatcher;
pub mod event;
pub mod notifier;
