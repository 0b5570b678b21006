//! Light/dark theme flag.

use crate::container::Container;
use crate::observable::Observable;
use tracing::debug;

/// Theme container. Light unless seeded otherwise.
#[derive(Clone, Debug)]
pub struct Theme {
    is_dark: Observable<bool>,
}

impl Theme {
    /// A light theme.
    pub fn new() -> Self {
        Self {
            is_dark: Observable::new(false),
        }
    }

    /// A theme that starts dark.
    pub fn dark() -> Self {
        Self {
            is_dark: Observable::new(true),
        }
    }

    /// Whether the dark theme is active.
    pub fn is_dark(&self) -> bool {
        self.is_dark.get()
    }

    /// Flip between light and dark.
    pub fn toggle(&self) {
        let is_dark = self.is_dark.update(|v| {
            *v = !*v;
            *v
        });
        debug!(is_dark, "theme toggled");
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for Theme {
    type State = bool;

    fn observable(&self) -> &Observable<bool> {
        &self.is_dark
    }
}
