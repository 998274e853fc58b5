//! Push-based authentication state.
//!
//! # Responsibility
//! - Hold the current sign-in state reported by the identity provider.
//! - Fan state changes out to subscribers registered at start-up.
//!
//! # Invariants
//! - A new subscriber immediately receives the current state.
//! - Every subscription is removed when its handle is dropped or
//!   explicitly unsubscribed; the observable never keeps dead callbacks.
//! - Listeners are invoked outside the internal lock, so a listener may
//!   subscribe or unsubscribe without deadlocking.

use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn {
        user_id: String,
        display_name: Option<String>,
    },
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }
}

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct Registry {
    state: AuthState,
    listeners: BTreeMap<u64, Listener>,
    next_id: u64,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observable sign-in state with explicit subscription handles.
#[derive(Clone, Default)]
pub struct AuthStateObservable {
    registry: Arc<Mutex<Registry>>,
}

impl AuthStateObservable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AuthState {
        lock(&self.registry).state.clone()
    }

    /// Publishes a new state to every live subscriber.
    ///
    /// Publishing a state equal to the current one is a no-op.
    pub fn set_state(&self, state: AuthState) {
        let listeners: Vec<Listener> = {
            let mut registry = lock(&self.registry);
            if registry.state == state {
                return;
            }
            registry.state = state.clone();
            registry.listeners.values().cloned().collect()
        };

        debug!(
            "event=auth_state module=auth status=changed signed_in={} listeners={}",
            state.is_signed_in(),
            listeners.len()
        );
        for listener in listeners {
            listener(&state);
        }
    }

    /// Registers `listener` and delivers the current state to it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (id, state) = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.insert(id, Arc::clone(&listener));
            (id, registry.state.clone())
        };

        listener(&state);
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Live registration on an `AuthStateObservable`.
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Stops delivery to this subscriber.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.remove(&self.id);
        }
    }
}
