//! A signed integer counter.

use crate::container::Container;
use crate::observable::Observable;
use tracing::debug;

/// Counter container. Starts at zero unless seeded.
#[derive(Clone, Debug)]
pub struct Counter {
    count: Observable<i64>,
}

impl Counter {
    /// A counter at zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A counter seeded with `value`.
    pub fn starting_at(value: i64) -> Self {
        Self {
            count: Observable::new(value),
        }
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.count.get()
    }

    /// Add one. Stays at `i64::MAX` once there.
    pub fn increment(&self) {
        self.change_by(1);
    }

    /// Subtract one. Stays at `i64::MIN` once there.
    pub fn decrement(&self) {
        self.change_by(-1);
    }

    /// Return to zero.
    pub fn reset(&self) {
        self.count.update(|n| *n = 0);
        debug!("counter reset");
    }

    fn change_by(&self, delta: i64) {
        // Saturates at the i64 bounds instead of overflowing.
        let count = self.count.update(|n| {
            *n = n.saturating_add(delta);
            *n
        });
        debug!(delta, count, "counter changed");
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for Counter {
    type State = i64;

    fn observable(&self) -> &Observable<i64> {
        &self.count
    }
}
