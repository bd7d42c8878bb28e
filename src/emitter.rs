//! In-process change notifications for a collection.
//!
//! Listeners run synchronously, in subscription order, after a mutation has
//! been fully applied. A panicking listener is contained and logged; its
//! siblings still run and the mutating call still returns normally.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::warn;

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Observer list fired after every effective mutation.
#[derive(Default)]
pub struct ChangeEmitter {
    listeners: Arc<Mutex<Listeners>>,
}

impl ChangeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    ///
    /// The listener stays registered for as long as the returned
    /// [`Subscription`] is alive (or forever, once detached).
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
            active: true,
        }
    }

    /// Run every listener once
    ///
    /// Works on a snapshot of the list, so listeners may subscribe or
    /// unsubscribe (themselves included) while being notified.
    pub fn emit(&self) {
        let snapshot: Vec<(u64, Listener)> = self.listeners.lock().entries.clone();

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                warn!(listener_id = id, "Change listener panicked");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }
}

impl std::fmt::Debug for ChangeEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle for a registered listener
///
/// Dropping the handle unsubscribes, so listeners cannot leak by accident.
#[must_use = "dropping a Subscription unsubscribes its listener immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
    active: bool,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered for the emitter's whole lifetime
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().entries.retain(|(id, _)| *id != self.id);
        }
        self.active = false;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.active {
            self.remove();
        }
    }
}
