//! Type-keyed registry of container instances.
//!
//! A [`Scope`] maps each container type to the single instance registered for
//! it. Scopes are built once through [`ScopeBuilder`] and are immutable
//! afterwards; all mutation goes through the containers themselves.
//!
//! Scopes nest: a child built with [`ScopeBuilder::with_parent`] answers
//! lookups for its own kinds and defers everything else to its ancestors, so
//! a kind registered in the child shadows the parent's instance for anyone
//! looking up through the child.

use crate::container::Container;
use crate::error::{Result, ScopeError};
use crate::observable::Observable;
use crate::{Counter, TaskList, Theme, User};
use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Scope bookkeeping on a type-erased observable.
trait Registration {
    fn attach(&self);
    fn detach(&self);
}

impl<T: 'static> Registration for Observable<T> {
    fn attach(&self) {
        self.attach_scope();
    }

    fn detach(&self) {
        self.detach_scope();
    }
}

/// One registered container, type-erased.
struct Entry {
    kind: &'static str,
    instance: Box<dyn Any>,
    registration: Box<dyn Registration>,
}

/// Collects registrations for a [`Scope`].
pub struct ScopeBuilder {
    parent: Option<Rc<Scope>>,
    entries: HashMap<TypeId, Entry>,
}

impl ScopeBuilder {
    /// Start a root scope.
    pub fn new() -> Self {
        Self {
            parent: None,
            entries: HashMap::new(),
        }
    }

    /// Start a scope nested inside `parent`.
    pub fn with_parent(parent: Rc<Scope>) -> Self {
        Self {
            parent: Some(parent),
            entries: HashMap::new(),
        }
    }

    /// Register the instance for container kind `C`.
    ///
    /// Registering the same kind twice in one scope is a wiring bug and fails
    /// with [`ScopeError::DuplicateKind`]. Shadowing a parent's kind is fine.
    pub fn register<C: Container>(mut self, instance: C) -> Result<Self> {
        let kind = type_name::<C>();
        match self.entries.entry(TypeId::of::<C>()) {
            MapEntry::Occupied(_) => Err(ScopeError::DuplicateKind { kind }),
            MapEntry::Vacant(slot) => {
                let registration = Box::new(instance.observable().clone());
                slot.insert(Entry {
                    kind,
                    instance: Box::new(instance),
                    registration,
                });
                Ok(self)
            }
        }
    }

    /// Finish construction.
    pub fn build(self) -> Scope {
        for entry in self.entries.values() {
            entry.registration.attach();
        }
        let scope = Scope {
            parent: self.parent,
            entries: self.entries,
        };
        debug!(kinds = ?scope.kinds(), nested = scope.parent.is_some(), "scope built");
        scope
    }
}

impl Default for ScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The composition root: one instance per container kind.
///
/// Dropping a scope clears the subscriber set of every container it
/// registered, unless another live scope also registered that instance.
/// Handles to the containers held elsewhere do not keep subscribers alive.
pub struct Scope {
    parent: Option<Rc<Scope>>,
    entries: HashMap<TypeId, Entry>,
}

impl Scope {
    /// Start building a root scope.
    pub fn builder() -> ScopeBuilder {
        ScopeBuilder::new()
    }

    /// A root scope holding the four stock containers in their default state.
    pub fn standard() -> Result<Self> {
        Ok(Self::builder()
            .register(Counter::new())?
            .register(User::new())?
            .register(Theme::new())?
            .register(TaskList::new())?
            .build())
    }

    /// The instance of kind `C` in this scope or the nearest ancestor that
    /// has one.
    pub fn lookup<C: Container>(&self) -> Result<&C> {
        self.find::<C>().ok_or(ScopeError::Unregistered {
            kind: type_name::<C>(),
        })
    }

    /// Whether `C` resolves through this scope.
    pub fn contains<C: Container>(&self) -> bool {
        self.find::<C>().is_some()
    }

    /// The enclosing scope, if this one is nested.
    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    /// Type names of the kinds registered directly in this scope, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.entries.values().map(|entry| entry.kind).collect();
        kinds.sort_unstable();
        kinds
    }

    fn find<C: Container>(&self) -> Option<&C> {
        self.entries
            .get(&TypeId::of::<C>())
            .and_then(|entry| entry.instance.downcast_ref::<C>())
            .or_else(|| self.parent.as_deref().and_then(|parent| parent.find::<C>()))
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        for entry in self.entries.values() {
            entry.registration.detach();
        }
        debug!(kinds = self.entries.len(), "scope torn down");
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("kinds", &self.kinds())
            .field("parent", &self.parent)
            .finish()
    }
}
