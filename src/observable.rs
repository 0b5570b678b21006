//! Observable state with synchronous change notification.
//!
//! [`Observable<T>`] is the capability every container embeds: it owns a value
//! and a subscriber registry, and notifies all current subscribers after each
//! mutation before returning to the caller.
//!
//! # Notification pass
//!
//! A pass iterates a snapshot of the registry taken when the pass starts.
//! Callbacks registered during the pass are not invoked until the next one;
//! callbacks removed during the pass are skipped if they have not run yet.
//! No borrow of the state or the registry is held while a callback runs, so
//! callbacks are free to read the state, subscribe, unsubscribe or mutate.

use crate::storage::{Subscriber, Subscribers, SubscriptionId};
use futures::channel::mpsc;
use futures::Stream;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use tracing::trace;

struct ObservableInner<T> {
    state: RefCell<T>,
    subscribers: RefCell<Subscribers>,
    /// Live scopes this observable is registered in.
    scopes: Cell<usize>,
}

/// Shared state plus the callbacks listening to it.
///
/// Cloning an `Observable` creates a new handle to the **same** state and
/// subscriber set.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

/// Handle to one registration, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: SubscriptionId,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("state", &self.inner.state.borrow())
            .field("subscriber_count", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Observable<T> {
    /// Create a new observable with no subscribers.
    pub fn new(state: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                state: RefCell::new(state),
                subscribers: RefCell::new(Subscribers::new()),
                scopes: Cell::new(0),
            }),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.state.borrow().clone()
    }

    /// Read the current state with a closure.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.state.borrow())
    }

    /// Mutate the state, then notify every subscriber.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut *self.inner.state.borrow_mut());
        self.notify_all();
        result
    }

    /// Mutate the state and notify only if the closure reports a change.
    ///
    /// Returns the closure's verdict. Used for guarded operations whose
    /// rejected inputs are defined to be no-ops.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = f(&mut *self.inner.state.borrow_mut());
        if changed {
            self.notify_all();
        }
        changed
    }

    /// Register a callback invoked after every mutation.
    ///
    /// Registering the same callback twice yields two independent
    /// registrations.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let callback: Subscriber = Rc::new(callback);
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let id = subscribers.insert(callback);
        trace!(?id, subscribers = subscribers.len(), "subscribed");
        Subscription { id }
    }

    /// Remove a registration. Removing one that is already gone is a no-op.
    ///
    /// Returns true if the registration was still present.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let removed = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let removed = subscribers.remove(subscription.id);
            trace!(
                id = ?subscription.id,
                removed = removed.is_some(),
                subscribers = subscribers.len(),
                "unsubscribed"
            );
            removed
        };
        // Dropped after the borrow ends: the callback may own an observer
        // whose teardown unsubscribes from this same registry.
        removed.is_some()
    }

    /// Whether `subscription` is still registered here.
    pub fn is_subscribed(&self, subscription: Subscription) -> bool {
        self.inner.subscribers.borrow().contains(subscription.id)
    }

    /// Invoke every current subscriber once.
    pub fn notify_all(&self) {
        let snapshot = self.inner.subscribers.borrow().snapshot();
        trace!(subscribers = snapshot.len(), "notification pass");
        for (id, callback) in snapshot {
            // Removed earlier in this pass.
            if !self.inner.subscribers.borrow().contains(id) {
                continue;
            }
            callback();
        }
    }

    /// Number of live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Identity of the shared state, equal across clones.
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    /// Record a registration in a scope.
    pub(crate) fn attach_scope(&self) {
        self.inner.scopes.set(self.inner.scopes.get() + 1);
    }

    /// Release a scope registration. When the last scope holding this
    /// observable goes away, every subscriber is dropped.
    pub(crate) fn detach_scope(&self) {
        let scopes = self.inner.scopes.get().saturating_sub(1);
        self.inner.scopes.set(scopes);
        if scopes == 0 {
            let removed = self.inner.subscribers.borrow_mut().take_all();
            trace!(subscribers = removed.len(), "subscribers cleared");
            drop(removed);
        }
    }

    /// A stream yielding `()` once per notification pass.
    ///
    /// The registration lives as long as the stream does.
    pub fn changes(&self) -> Changes {
        let (tx, rx) = mpsc::unbounded::<()>();
        let subscription = self.subscribe(move || {
            // The receiver only disappears together with the subscription.
            let _ = tx.unbounded_send(());
        });
        let observable = self.clone();
        Changes {
            receiver: rx,
            release: Some(Box::new(move || {
                observable.unsubscribe(subscription);
            })),
        }
    }
}

/// Stream of change notifications returned by [`Observable::changes`].
///
/// Dropping it unsubscribes.
pub struct Changes {
    receiver: mpsc::UnboundedReceiver<()>,
    release: Option<Box<dyn FnOnce()>>,
}

impl Stream for Changes {
    type Item = ();

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<()>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl Drop for Changes {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Changes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Changes").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::StreamExt;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Unsubscribes another registration when dropped.
    struct UnsubscribeOnDrop {
        observable: Observable<i32>,
        subscription: Subscription,
    }

    impl Drop for UnsubscribeOnDrop {
        fn drop(&mut self) {
            self.observable.unsubscribe(self.subscription);
        }
    }

    #[test]
    fn test_update_is_visible_immediately() {
        let observable = Observable::new(5);
        observable.update(|n| *n *= 2);
        assert_eq!(observable.get(), 10);
        assert_eq!(observable.with(|n| *n + 1), 11);
    }

    #[test]
    fn test_every_subscriber_sees_post_mutation_state() {
        let observable = Observable::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..3 {
            let seen = seen.clone();
            let reader = observable.clone();
            observable.subscribe(move || seen.lock().push(reader.get()));
        }

        observable.update(|n| *n += 1);
        assert_eq!(*seen.lock(), vec![1, 1, 1]);

        observable.update(|n| *n += 1);
        assert_eq!(*seen.lock(), vec![1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_duplicate_callback_notified_twice() {
        let observable = Observable::new(());
        let count = Rc::new(Cell::new(0));
        let callback = {
            let count = count.clone();
            move || count.set(count.get() + 1)
        };

        observable.subscribe(callback.clone());
        observable.subscribe(callback);
        observable.notify_all();

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let observable = Observable::new(0);
        let count = Rc::new(Cell::new(0));
        let subscription = observable.subscribe({
            let count = count.clone();
            move || count.set(count.get() + 1)
        });

        observable.update(|n| *n += 1);
        assert!(observable.unsubscribe(subscription));
        observable.update(|n| *n += 1);
        observable.update(|n| *n += 1);

        assert_eq!(count.get(), 1);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let observable = Observable::new(0);
        let keep = observable.subscribe(|| {});
        let subscription = observable.subscribe(|| {});

        assert!(observable.unsubscribe(subscription));
        assert!(!observable.unsubscribe(subscription));
        assert_eq!(observable.subscriber_count(), 1);
        assert!(observable.unsubscribe(keep));
    }

    #[test]
    fn test_removed_during_pass_is_skipped() {
        let observable = Observable::new(0);
        let victim: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let victim_calls = Rc::new(Cell::new(0));

        observable.subscribe({
            let observable = observable.clone();
            let victim = victim.clone();
            move || {
                if let Some(subscription) = victim.get() {
                    observable.unsubscribe(subscription);
                }
            }
        });
        victim.set(Some(observable.subscribe({
            let victim_calls = victim_calls.clone();
            move || victim_calls.set(victim_calls.get() + 1)
        })));

        observable.update(|n| *n += 1);
        assert_eq!(victim_calls.get(), 0);
        assert_eq!(observable.subscriber_count(), 1);
    }

    #[test]
    fn test_subscribed_during_pass_waits_for_next_pass() {
        let observable = Observable::new(0);
        let late_calls = Rc::new(Cell::new(0));
        let registered = Rc::new(Cell::new(false));

        observable.subscribe({
            let observable = observable.clone();
            let late_calls = late_calls.clone();
            let registered = registered.clone();
            move || {
                if !registered.replace(true) {
                    let late_calls = late_calls.clone();
                    observable.subscribe(move || late_calls.set(late_calls.get() + 1));
                }
            }
        });

        observable.update(|n| *n += 1);
        assert_eq!(late_calls.get(), 0);

        observable.update(|n| *n += 1);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_update_if_skips_notification_when_unchanged() {
        let observable = Observable::new(vec![1]);
        let count = Rc::new(Cell::new(0));
        observable.subscribe({
            let count = count.clone();
            move || count.set(count.get() + 1)
        });

        assert!(!observable.update_if(|_| false));
        assert_eq!(count.get(), 0);

        assert!(observable.update_if(|v| {
            v.push(2);
            true
        }));
        assert_eq!(count.get(), 1);
        assert_eq!(observable.get(), vec![1, 2]);
    }

    #[test]
    fn test_mutation_from_callback_does_not_panic() {
        let observable = Observable::new(0);
        observable.subscribe({
            let observable = observable.clone();
            move || {
                if observable.get() < 3 {
                    observable.update(|n| *n += 1);
                }
            }
        });

        observable.update(|n| *n += 1);
        assert_eq!(observable.get(), 3);
    }

    #[test]
    fn test_changes_stream() {
        let observable = Observable::new(0);
        let mut changes = observable.changes();
        assert_eq!(observable.subscriber_count(), 1);

        observable.update(|n| *n += 1);
        observable.update(|n| *n += 1);

        block_on(async {
            assert_eq!(changes.next().await, Some(()));
            assert_eq!(changes.next().await, Some(()));
        });

        drop(changes);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn test_dropping_removed_callback_can_reenter_registry() {
        let observable = Observable::new(0);
        let other = observable.subscribe(|| {});
        let guard = UnsubscribeOnDrop {
            observable: observable.clone(),
            subscription: other,
        };
        let owner = observable.subscribe(move || {
            let _ = &guard;
        });

        assert!(observable.unsubscribe(owner));
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn test_is_subscribed() {
        let observable = Observable::new(0);
        let subscription = observable.subscribe(|| {});
        assert!(observable.is_subscribed(subscription));

        observable.unsubscribe(subscription);
        assert!(!observable.is_subscribed(subscription));
    }
}
