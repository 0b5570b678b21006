//! Observers and the two ways of reaching a container through a scope.
//!
//! An [`Observer`] is the explicit identity of something that renders from
//! container state: a re-evaluation callback plus the subscriptions it holds.
//! The [`Accessor`] trait gives it two entry points:
//!
//! - [`watch`](Accessor::watch) subscribes the observer to a container and
//!   returns the current state. Every later mutation re-runs the observer.
//! - [`read`](Accessor::read) hands back the container for dispatching a
//!   mutation, without subscribing anyone.
//!
//! # Example
//!
//! ```rust,no_run
//! use scoped_state::prelude::*;
//! use std::rc::Rc;
//!
//! let scope = Rc::new(Scope::standard()?);
//! let label = Observer::new({
//!     let scope = scope.clone();
//!     move |observer| {
//!         let count = scope.watch::<Counter>(observer).unwrap_or_default();
//!         println!("count: {count}");
//!     }
//! });
//! label.evaluate();
//!
//! scope.read::<Counter>()?.increment(); // prints "count: 1"
//! label.teardown();
//! # Ok::<(), scoped_state::ScopeError>(())
//! ```

use crate::container::Container;
use crate::error::Result;
use crate::scope::Scope;
use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// One container subscription held by an observer.
struct Tracked {
    /// Whether the container still holds the subscription. A scope teardown
    /// can drop it behind the observer's back.
    live: Box<dyn Fn() -> bool>,
    /// Removes the subscription from its container.
    release: Box<dyn FnOnce()>,
}

struct ObserverInner {
    rebuild: Box<dyn Fn(&Observer)>,
    /// Keyed by container identity so repeated `watch` calls share one
    /// subscription.
    subscriptions: RefCell<HashMap<usize, Tracked>>,
    evaluations: Cell<u64>,
}

impl Drop for ObserverInner {
    fn drop(&mut self) {
        for (_, tracked) in self.subscriptions.get_mut().drain() {
            (tracked.release)();
        }
    }
}

/// Something re-evaluated whenever a container it watches changes.
///
/// Clones share identity. Subscriptions end on [`teardown`](Self::teardown)
/// or when the last clone is dropped; containers only hold weak references to
/// observers.
#[derive(Clone)]
pub struct Observer {
    inner: Rc<ObserverInner>,
}

impl Observer {
    /// Create an observer from its re-evaluation callback.
    ///
    /// The callback is not run until [`evaluate`](Self::evaluate) is called,
    /// which is how the first build happens.
    pub fn new(rebuild: impl Fn(&Observer) + 'static) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                rebuild: Box::new(rebuild),
                subscriptions: RefCell::new(HashMap::new()),
                evaluations: Cell::new(0),
            }),
        }
    }

    /// Run the re-evaluation callback now.
    pub fn evaluate(&self) {
        self.inner.evaluations.set(self.inner.evaluations.get() + 1);
        (self.inner.rebuild)(self);
    }

    /// How many times the observer has been evaluated.
    pub fn evaluations(&self) -> u64 {
        self.inner.evaluations.get()
    }

    /// Number of containers the observer is subscribed to.
    pub fn subscription_count(&self) -> usize {
        self.inner
            .subscriptions
            .borrow()
            .values()
            .filter(|tracked| (tracked.live)())
            .count()
    }

    /// Remove every subscription this observer holds. Idempotent.
    ///
    /// Calling `watch` with the observer afterwards subscribes it again.
    pub fn teardown(&self) {
        let tracked: Vec<Tracked> = self
            .inner
            .subscriptions
            .borrow_mut()
            .drain()
            .map(|(_, tracked)| tracked)
            .collect();
        trace!(subscriptions = tracked.len(), "observer torn down");
        for tracked in tracked {
            (tracked.release)();
        }
    }

    /// Subscribe to `container` unless already subscribed.
    fn track<C: Container>(&self, container: &C) {
        let key = container.observable().key();
        let live = self
            .inner
            .subscriptions
            .borrow()
            .get(&key)
            .map(|tracked| (tracked.live)());
        match live {
            Some(true) => return,
            Some(false) => {
                let stale = self.inner.subscriptions.borrow_mut().remove(&key);
                trace!(kind = type_name::<C>(), "replacing dropped subscription");
                drop(stale);
            }
            None => {}
        }

        let observer: Weak<ObserverInner> = Rc::downgrade(&self.inner);
        let subscription = container.subscribe(move || {
            // Observer gone, nothing to re-run.
            if let Some(inner) = observer.upgrade() {
                Observer { inner }.evaluate();
            }
        });
        trace!(kind = type_name::<C>(), "observer subscribed");

        let tracked = Tracked {
            live: Box::new({
                let container = container.clone();
                move || container.observable().is_subscribed(subscription)
            }),
            release: Box::new({
                let container = container.clone();
                move || {
                    container.unsubscribe(subscription);
                }
            }),
        };
        self.inner.subscriptions.borrow_mut().insert(key, tracked);
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Observer {}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("subscriptions", &self.subscription_count())
            .field("evaluations", &self.evaluations())
            .finish()
    }
}

/// Subscribing and one-shot access to containers.
pub trait Accessor {
    /// Subscribe `observer` to container kind `C` and return its current state.
    ///
    /// Watching the same container again from the same observer keeps the
    /// existing subscription, so an observer that calls `watch` on every
    /// evaluation stays subscribed exactly once.
    fn watch<C: Container>(&self, observer: &Observer) -> Result<C::State>;

    /// Get container kind `C` for dispatching a mutation. Subscribes nobody.
    fn read<C: Container>(&self) -> Result<C>;
}

impl Accessor for Scope {
    fn watch<C: Container>(&self, observer: &Observer) -> Result<C::State> {
        let container = self.lookup::<C>()?;
        observer.track(container);
        Ok(container.state())
    }

    fn read<C: Container>(&self) -> Result<C> {
        self.lookup::<C>().cloned()
    }
}
