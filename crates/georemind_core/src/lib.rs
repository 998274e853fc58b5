//! Core of GeoRemind: durable geolocated reminders and the pipeline that
//! turns geofence entry events into notifications.

pub mod auth;
pub mod config;
pub mod db;
pub mod geofence;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use auth::{AuthState, AuthStateObservable, Subscription};
pub use config::{ConfigError, CoreConfig};
pub use geofence::dispatcher::{
    DispatchHandle, DispatchReport, DispatcherConfig, EventStatus, GeofenceDispatcher,
    RegionFailure,
};
pub use geofence::event::{
    geofence_error_message, EventDisposition, GeofencingEvent, TransitionKind, TriggeringRegion,
};
pub use geofence::notifier::{ChannelNotifier, LogNotifier, NotificationPayload, Notifier};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::reminder::{Reminder, ReminderId, ReminderValidationError};
pub use service::reminder_service::{ReminderDraft, ReminderService};
pub use store::{
    FixtureReminderStore, ReminderStore, SqliteReminderStore, StoreError, StoreResult,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
