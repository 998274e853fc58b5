//! Inbound geofence transition events.
//!
//! # Responsibility
//! - Model what the location monitor delivers: either an error status or a
//!   transition with the regions that triggered it.
//! - Classify an event into the one shape the dispatcher acts on.
//!
//! # Invariants
//! - An error event carries no transition data.
//! - A missing region list is equivalent to an empty one.

use crate::model::reminder::ReminderId;
use serde::{Deserialize, Serialize};

/// Monitor status: geofence service is not available now.
pub const GEOFENCE_NOT_AVAILABLE: i32 = 1000;
/// Monitor status: the app registered more geofences than allowed.
pub const GEOFENCE_TOO_MANY_GEOFENCES: i32 = 1001;
/// Monitor status: too many pending callbacks were registered.
pub const GEOFENCE_TOO_MANY_PENDING_INTENTS: i32 = 1002;

/// Maps a monitor status code to diagnostic text.
pub fn geofence_error_message(code: i32) -> &'static str {
    match code {
        GEOFENCE_NOT_AVAILABLE => "geofence service is not available now",
        GEOFENCE_TOO_MANY_GEOFENCES => "too many geofences registered",
        GEOFENCE_TOO_MANY_PENDING_INTENTS => "too many pending geofence callbacks",
        _ => "unknown geofence error",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Entered,
    Exited,
    Dwell,
}

impl TransitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entered => "entered",
            Self::Exited => "exited",
            Self::Dwell => "dwell",
        }
    }
}

/// One region that fired. `request_id` equals the reminder id used at
/// registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeringRegion {
    pub request_id: ReminderId,
}

impl TriggeringRegion {
    pub fn new(request_id: impl Into<ReminderId>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

/// Raw event handed over by the location monitor's delivery callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeofencingEvent {
    Error {
        code: i32,
    },
    Transition {
        kind: TransitionKind,
        #[serde(default)]
        triggering_regions: Option<Vec<TriggeringRegion>>,
    },
}

/// What the dispatcher should do with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// Region entry; look up every region in order of arrival.
    Accepted(Vec<TriggeringRegion>),
    /// Exit or dwell transitions are not acted on.
    Ignored(TransitionKind),
    /// The monitor reported an error; nothing to look up.
    Rejected { code: i32 },
}

impl GeofencingEvent {
    /// Convenience constructor for a region-entry event.
    pub fn entered<I, S>(request_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ReminderId>,
    {
        Self::Transition {
            kind: TransitionKind::Entered,
            triggering_regions: Some(request_ids.into_iter().map(TriggeringRegion::new).collect()),
        }
    }

    pub fn classify(self) -> EventDisposition {
        match self {
            Self::Error { code } => EventDisposition::Rejected { code },
            Self::Transition {
                kind: TransitionKind::Entered,
                triggering_regions,
            } => EventDisposition::Accepted(triggering_regions.unwrap_or_default()),
            Self::Transition { kind, .. } => EventDisposition::Ignored(kind),
        }
    }
}
