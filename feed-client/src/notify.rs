//! Observer registry for feed changes.
//!
//! Observers are plain callbacks. [`Notifier::subscribe`] returns a
//! [`Subscription`] handle; dropping it unsubscribes, so an observer can never
//! outlive the thing that registered it.
//!
//! Delivery is synchronous: [`Notifier::publish`] runs every observer on the
//! calling task, in subscription order, before returning. The registry lock is
//! not held while observers run, so a callback may subscribe or unsubscribe.

use imagefeed_core::{FeedEvent, FeedSnapshot};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// What observers receive: the event plus the committed state it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedNotification {
    /// What happened.
    pub event: FeedEvent,
    /// Full feed state after the change.
    pub snapshot: FeedSnapshot,
}

type Observer = Arc<dyn Fn(&FeedNotification) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<(u64, Observer)>,
}

/// Publishes [`FeedNotification`]s to any number of observers.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
}

impl Notifier {
    /// Create a notifier with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. It stays registered until the handle is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&FeedNotification) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.observers.push((id, Arc::new(observer)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `notification` to every current observer.
    ///
    /// Returns how many observers were called.
    pub fn publish(&self, notification: &FeedNotification) -> usize {
        let observers: Vec<Observer> = lock(&self.registry)
            .observers
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in &observers {
            observer(notification);
        }
        observers.len()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.registry).observers.len()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Handle for a registered observer; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the observer immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Unsubscribe now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry)
                .observers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
