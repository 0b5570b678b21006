//! Generational storage for subscriber callbacks.
//!
//! Each observable owns one [`Subscribers`] registry. Handles are slot map keys
//! with generational indices, so removing a stale or already removed handle is
//! a harmless no-op instead of evicting whichever callback reused the slot.

use slotmap::{new_key_type, SlotMap};
use std::rc::Rc;

new_key_type! {
    /// Unique identifier for a subscription within one registry.
    pub struct SubscriptionId;
}

/// Subscriber callback for state changes.
pub(crate) type Subscriber = Rc<dyn Fn()>;

/// The set of callbacks currently listening to one observable.
///
/// Iteration follows slot order, which is stable for a fixed set of
/// subscribers, so a notification pass is deterministic.
pub(crate) struct Subscribers {
    callbacks: SlotMap<SubscriptionId, Subscriber>,
}

impl Subscribers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            callbacks: SlotMap::with_key(),
        }
    }

    /// Register a callback. The same callback registered twice gets two ids.
    pub fn insert(&mut self, callback: Subscriber) -> SubscriptionId {
        self.callbacks.insert(callback)
    }

    /// Remove a registration and hand back its callback, or `None` if it was
    /// already gone.
    ///
    /// The caller drops the callback. It may own observers whose teardown
    /// re-enters this registry, so it must not be dropped under a borrow.
    pub fn remove(&mut self, id: SubscriptionId) -> Option<Subscriber> {
        self.callbacks.remove(id)
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.callbacks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Remove every registration, handing the callbacks back like
    /// [`remove`](Self::remove).
    pub fn take_all(&mut self) -> Vec<Subscriber> {
        self.callbacks.drain().map(|(_, callback)| callback).collect()
    }

    /// Clone out the current registrations so they can be invoked after the
    /// registry borrow is released.
    pub fn snapshot(&self) -> Vec<(SubscriptionId, Subscriber)> {
        self.callbacks
            .iter()
            .map(|(id, callback)| (id, callback.clone()))
            .collect()
    }
}
