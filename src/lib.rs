//! # Scoped State
//!
//! Observable state containers shared through a type-keyed scope.
//!
//! ## Features
//!
//! - **Composable observables**: containers embed an [`Observable`] instead of
//!   inheriting notification behavior
//! - **Synchronous notification**: every subscriber sees the post-mutation
//!   state before the mutation returns
//! - **Two access modes**: [`Accessor::watch`] subscribes an explicit
//!   [`Observer`], [`Accessor::read`] only dispatches
//! - **Scoped registry**: one instance per container type, nestable, with
//!   wiring mistakes reported as [`ScopeError`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use scoped_state::prelude::*;
//!
//! let scope = Scope::standard()?;
//! let tasks = scope.read::<TaskList>()?;
//! tasks.add_task("buy milk");
//! tasks.add_task("   "); // ignored
//! assert_eq!(tasks.len(), 1);
//! # Ok::<(), scoped_state::ScopeError>(())
//! ```

mod accessor;
mod container;
mod counter;
mod error;
mod observable;
mod scope;
mod storage;
mod task_list;
mod theme;
mod user;

pub use accessor::{Accessor, Observer};
pub use container::Container;
pub use counter::Counter;
pub use error::{Result, ScopeError};
pub use observable::{Changes, Observable, Subscription};
pub use scope::{Scope, ScopeBuilder};
pub use task_list::TaskList;
pub use theme::Theme;
pub use user::{User, ADMIN_NAME, GUEST_NAME};

// Re-export the prelude
pub mod prelude {
    pub use crate::{
        Accessor, Container, Counter, Observer, Scope, ScopeBuilder, TaskList, Theme, User,
    };
}
