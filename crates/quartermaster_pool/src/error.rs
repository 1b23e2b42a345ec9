//! Error types for pool operations.

use core::time::Duration;

use crate::ResourceId;

/// Errors that can occur during pool operations.
///
/// Categories are carried as their [`label`](crate::Category::label) so the
/// error type does not depend on the category type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// A resource was released into, or seeded into, a pool of another category.
    #[error("category mismatch: pool holds {expected}, resource belongs to {found}")]
    CategoryMismatch {
        /// The pool's category.
        expected: String,
        /// The resource's category.
        found: String,
    },

    /// A bounded acquisition timed out while the pool stayed empty.
    #[error("pool {category} exhausted: no resource became available within {timeout:?}")]
    Exhausted {
        /// The exhausted category.
        category: String,
        /// How long the caller waited.
        timeout: Duration,
    },

    /// A resource was released that is not currently checked out from this pool.
    #[error("resource {resource} is not checked out from pool {category}")]
    NotCheckedOut {
        /// The pool's category.
        category: String,
        /// The offending resource.
        resource: ResourceId,
    },

    /// The same resource was seeded into a pool twice.
    #[error("resource {resource} seeded twice into pool {category}")]
    DuplicateResource {
        /// The pool's category.
        category: String,
        /// The duplicated resource.
        resource: ResourceId,
    },

    /// The pool was closed while (or before) the caller waited.
    #[error("pool {category} is closed")]
    Closed {
        /// The closed category.
        category: String,
    },
}

impl PoolError {
    /// Returns `true` if this is an [`Exhausted`](Self::Exhausted) error.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
