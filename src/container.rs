//! The capability shared by every concrete container.

use crate::observable::{Changes, Observable, Subscription};

/// A unit of observable state that can be registered in a [`Scope`](crate::Scope).
///
/// Implementors embed an [`Observable`] and expose their own mutation
/// operations; everything else is provided here. Containers are cheap handles:
/// clones share the same state and subscribers.
pub trait Container: Clone + 'static {
    /// The state observers read.
    type State: Clone + 'static;

    /// The embedded observable.
    fn observable(&self) -> &Observable<Self::State>;

    /// Current state. No side effects.
    fn state(&self) -> Self::State {
        self.observable().get()
    }

    /// Register a callback invoked after every mutation.
    fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.observable().subscribe(callback)
    }

    /// Remove a registration; a no-op if it is already gone.
    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.observable().unsubscribe(subscription)
    }

    /// Number of live registrations.
    fn subscriber_count(&self) -> usize {
        self.observable().subscriber_count()
    }

    /// Change notifications as a stream.
    fn changes(&self) -> Changes {
        self.observable().changes()
    }
}
