//! Notification delivery seam.
//!
//! # Responsibility
//! - Define the payload handed to whatever renders a reminder notification.
//! - Provide non-blocking notifier implementations.
//!
//! # Invariants
//! - A payload is only ever built from a successfully looked-up reminder.
//! - `Notifier::notify` is fire-and-forget; the dispatcher consumes no result.

use crate::model::reminder::{Reminder, ReminderId};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Projection of a reminder used to render a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: ReminderId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&Reminder> for NotificationPayload {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.clone(),
            title: reminder.title.clone(),
            description: reminder.description.clone(),
            location_name: reminder.location_name.clone(),
            latitude: reminder.latitude,
            longitude: reminder.longitude,
        }
    }
}

impl From<Reminder> for NotificationPayload {
    fn from(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title,
            description: reminder.description,
            location_name: reminder.location_name,
            latitude: reminder.latitude,
            longitude: reminder.longitude,
        }
    }
}

/// Receives one call per resolved region.
///
/// Implementations must return quickly; anything slow belongs behind a
/// queue (see `ChannelNotifier`).
pub trait Notifier: Send + Sync {
    fn notify(&self, payload: NotificationPayload);
}

/// Queues payloads onto an unbounded channel drained by the renderer.
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<NotificationPayload>,
}

impl ChannelNotifier {
    /// Creates the notifier together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationPayload>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, payload: NotificationPayload) {
        let reminder_id = payload.id.clone();
        if self.sender.send(payload).is_err() {
            warn!(
                "event=notify module=notifier status=dropped reminder_id={reminder_id} reason=receiver_closed"
            );
        }
    }
}

/// Writes each notification as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, payload: NotificationPayload) {
        info!(
            "event=notify module=notifier status=ok reminder_id={} title={:?} location={:?}",
            payload.id, payload.title, payload.location_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelNotifier, NotificationPayload, Notifier};
    use crate::model::reminder::Reminder;

    #[test]
    fn payload_copies_all_reminder_fields() {
        let reminder = Reminder::new("Grocery", "Buy fruit", "Market Street", 6.61, 7.43);
        let payload = NotificationPayload::from(&reminder);

        assert_eq!(payload.id, reminder.id);
        assert_eq!(payload.title.as_deref(), Some("Grocery"));
        assert_eq!(payload.description.as_deref(), Some("Buy fruit"));
        assert_eq!(payload.location_name.as_deref(), Some("Market Street"));
        assert_eq!(payload.latitude, Some(6.61));
        assert_eq!(payload.longitude, Some(7.43));
    }

    #[test]
    fn channel_notifier_queues_and_survives_closed_receiver() {
        let (notifier, mut receiver) = ChannelNotifier::channel();
        notifier.notify(NotificationPayload::from(Reminder::with_id("one")));

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.id, "one");

        drop(receiver);
        notifier.notify(NotificationPayload::from(Reminder::with_id("two")));
    }
}
