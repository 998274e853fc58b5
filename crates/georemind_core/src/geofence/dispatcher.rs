//! Geofence transition dispatcher.
//!
//! # Responsibility
//! - Turn one monitor event into at most one notification per triggering
//!   region.
//! - Run region lookups concurrently on the blocking pool and tolerate any
//!   individual lookup failing.
//!
//! # Invariants
//! - Only region-entry events without a monitor error cause lookups.
//! - Each region gets its own lookup, duplicates included; no retries.
//! - A failed or panicking region never affects sibling regions and never
//!   propagates to the caller.
//! - `submit_event` returns only after every lookup task has been spawned.

use crate::geofence::event::{
    geofence_error_message, EventDisposition, GeofencingEvent, TransitionKind, TriggeringRegion,
};
use crate::geofence::notifier::{NotificationPayload, Notifier};
use crate::model::reminder::ReminderId;
use crate::store::ReminderStore;
use log::{debug, error, info, warn};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Tuning knobs for the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Upper bound on lookups in flight across all events. `None` = unbounded.
    pub max_concurrent_lookups: Option<NonZeroUsize>,
}

/// How an event was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Accepted { regions: usize },
    Ignored(TransitionKind),
    Rejected { code: i32 },
}

/// One region whose lookup failed for a reason other than absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFailure {
    pub request_id: ReminderId,
    pub error_code: &'static str,
    pub message: String,
}

/// Per-event summary collected after every lookup finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub status: EventStatus,
    /// Ids notified, in completion order.
    pub notified: Vec<ReminderId>,
    pub not_found: Vec<ReminderId>,
    pub failed: Vec<RegionFailure>,
}

impl DispatchReport {
    fn empty(status: EventStatus) -> Self {
        Self {
            status,
            notified: Vec::new(),
            not_found: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn notification_count(&self) -> usize {
        self.notified.len()
    }
}

enum RegionOutcome {
    Notified(ReminderId),
    NotFound(ReminderId),
    Failed(RegionFailure),
}

/// Handle to an acknowledged event whose lookups may still be running.
///
/// Dropping it does not cancel the lookups.
pub struct DispatchHandle {
    seq: u64,
    status: EventStatus,
    started_at: Instant,
    tasks: Vec<(ReminderId, JoinHandle<RegionOutcome>)>,
}

impl DispatchHandle {
    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Number of lookups issued for this event.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every region and summarizes the outcome.
    pub async fn wait(self) -> DispatchReport {
        let mut report = DispatchReport::empty(self.status);
        if self.tasks.is_empty() {
            return report;
        }

        for (request_id, task) in self.tasks {
            match task.await {
                Ok(RegionOutcome::Notified(id)) => report.notified.push(id),
                Ok(RegionOutcome::NotFound(id)) => report.not_found.push(id),
                Ok(RegionOutcome::Failed(failure)) => report.failed.push(failure),
                Err(err) => {
                    error!(
                        "event=geofence_region module=dispatcher status=error event_seq={} request_id={} error_code=region_task_aborted error={}",
                        self.seq, request_id, err
                    );
                    report.failed.push(RegionFailure {
                        request_id,
                        error_code: "region_task_aborted",
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            "event=geofence_dispatch module=dispatcher status=done event_seq={} notified={} not_found={} failed={} duration_ms={}",
            self.seq,
            report.notified.len(),
            report.not_found.len(),
            report.failed.len(),
            self.started_at.elapsed().as_millis()
        );
        report
    }
}

/// Resolves triggering regions against a store and notifies on hits.
pub struct GeofenceDispatcher<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    limiter: Option<Arc<Semaphore>>,
    next_seq: AtomicU64,
}

impl<S, N> GeofenceDispatcher<S, N>
where
    S: ReminderStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self::with_config(store, notifier, DispatcherConfig::default())
    }

    pub fn with_config(store: Arc<S>, notifier: Arc<N>, config: DispatcherConfig) -> Self {
        Self {
            store,
            notifier,
            limiter: config
                .max_concurrent_lookups
                .map(|limit| Arc::new(Semaphore::new(limit.get()))),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Validates the event and spawns one lookup task per region.
    ///
    /// Returns once every lookup is issued, which is the point where the
    /// monitor's delivery callback may treat the event as acknowledged.
    ///
    /// With `max_concurrent_lookups` set, "issued" means the region task is
    /// spawned and queued on the limiter; its store lookup may not have
    /// started yet when this returns.
    pub async fn submit_event(&self, event: GeofencingEvent) -> DispatchHandle {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let started_at = Instant::now();

        let regions = match event.classify() {
            EventDisposition::Rejected { code } => {
                error!(
                    "event=geofence_dispatch module=dispatcher status=rejected event_seq={seq} monitor_code={code} error={}",
                    geofence_error_message(code)
                );
                return DispatchHandle {
                    seq,
                    status: EventStatus::Rejected { code },
                    started_at,
                    tasks: Vec::new(),
                };
            }
            EventDisposition::Ignored(kind) => {
                debug!(
                    "event=geofence_dispatch module=dispatcher status=ignored event_seq={seq} transition={}",
                    kind.as_str()
                );
                return DispatchHandle {
                    seq,
                    status: EventStatus::Ignored(kind),
                    started_at,
                    tasks: Vec::new(),
                };
            }
            EventDisposition::Accepted(regions) => regions,
        };

        info!(
            "event=geofence_dispatch module=dispatcher status=start event_seq={seq} regions={}",
            regions.len()
        );

        let status = EventStatus::Accepted {
            regions: regions.len(),
        };
        let tasks = regions
            .into_iter()
            .map(|region| {
                let request_id = region.request_id.clone();
                let task = tokio::spawn(resolve_region(
                    seq,
                    region,
                    Arc::clone(&self.store),
                    Arc::clone(&self.notifier),
                    self.limiter.clone(),
                ));
                (request_id, task)
            })
            .collect();

        DispatchHandle {
            seq,
            status,
            started_at,
            tasks,
        }
    }

    /// Submits the event and waits for all of its lookups.
    pub async fn handle_event(&self, event: GeofencingEvent) -> DispatchReport {
        self.submit_event(event).await.wait().await
    }
}

async fn resolve_region<S, N>(
    seq: u64,
    region: TriggeringRegion,
    store: Arc<S>,
    notifier: Arc<N>,
    limiter: Option<Arc<Semaphore>>,
) -> RegionOutcome
where
    S: ReminderStore + 'static,
    N: Notifier + 'static,
{
    // The semaphore is never closed, so acquisition only fails if it is
    // dropped; proceed unbounded in that case.
    let _permit = match limiter {
        Some(limiter) => limiter.acquire_owned().await.ok(),
        None => None,
    };

    let request_id = region.request_id;
    let lookup_id = request_id.clone();
    let lookup = tokio::task::spawn_blocking(move || store.get_reminder(&lookup_id)).await;

    match lookup {
        Ok(Ok(reminder)) => {
            notifier.notify(NotificationPayload::from(reminder));
            debug!(
                "event=geofence_region module=dispatcher status=notified event_seq={seq} request_id={request_id}"
            );
            RegionOutcome::Notified(request_id)
        }
        Ok(Err(err)) if err.is_backend() => {
            error!(
                "event=geofence_region module=dispatcher status=error event_seq={seq} request_id={request_id} error_code={} sqlite_code={:?} error={}",
                err.error_code(),
                err.code(),
                err
            );
            RegionOutcome::Failed(RegionFailure {
                request_id,
                error_code: err.error_code(),
                message: err.message(),
            })
        }
        Ok(Err(err)) if err.is_not_found() => {
            warn!(
                "event=geofence_region module=dispatcher status=dropped event_seq={seq} request_id={request_id} error_code={}",
                err.error_code()
            );
            RegionOutcome::NotFound(request_id)
        }
        Ok(Err(err)) => {
            warn!(
                "event=geofence_region module=dispatcher status=dropped event_seq={seq} request_id={request_id} error_code={} error={}",
                err.error_code(),
                err
            );
            RegionOutcome::Failed(RegionFailure {
                request_id,
                error_code: err.error_code(),
                message: err.message(),
            })
        }
        Err(err) => {
            error!(
                "event=geofence_region module=dispatcher status=error event_seq={seq} request_id={request_id} error_code=lookup_task_failed error={err}"
            );
            RegionOutcome::Failed(RegionFailure {
                request_id,
                error_code: "lookup_task_failed",
                message: err.to_string(),
            })
        }
    }
}
