//! Configuration errors raised while wiring or querying a scope.

use thiserror::Error;

/// Wiring mistakes detected when a scope is built or queried.
///
/// These indicate a bug in the composition root, not a runtime condition,
/// and are expected to abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The same container kind was registered twice in one scope.
    #[error("container kind `{kind}` is already registered in this scope")]
    DuplicateKind {
        /// Type name of the container.
        kind: &'static str,
    },

    /// No scope in the chain has a container of this kind.
    #[error("container kind `{kind}` is not registered in any enclosing scope")]
    Unregistered {
        /// Type name of the container.
        kind: &'static str,
    },
}

/// Result type for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;
