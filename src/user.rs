//! The current user's display name.

use crate::container::Container;
use crate::observable::Observable;
use tracing::debug;

/// Name shown before anyone signs in.
pub const GUEST_NAME: &str = "Guest";

/// Name assigned by [`User::set_admin`].
pub const ADMIN_NAME: &str = "Admin";

/// Named-user container.
#[derive(Clone, Debug)]
pub struct User {
    name: Observable<String>,
}

impl User {
    /// A user named [`GUEST_NAME`].
    pub fn new() -> Self {
        Self::named(GUEST_NAME)
    }

    /// A user with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Observable::new(name.into()),
        }
    }

    /// Current name.
    pub fn name(&self) -> String {
        self.name.get()
    }

    /// Rename to [`ADMIN_NAME`].
    pub fn set_admin(&self) {
        self.change_name(ADMIN_NAME);
    }

    /// Rename to `name`. Any string is accepted, including an empty one.
    pub fn change_name(&self, name: impl Into<String>) {
        let name = name.into();
        debug!(%name, "user renamed");
        self.name.update(|current| *current = name);
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for User {
    type State = String;

    fn observable(&self) -> &Observable<String> {
        &self.name
    }
}
