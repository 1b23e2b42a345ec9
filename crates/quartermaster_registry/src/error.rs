//! Error types for registry operations.

use quartermaster_pool::PoolError;

use crate::TestId;

/// Errors that can occur during registry operations.
///
/// Every error is scoped to the offending call; the registry never retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// `begin_test` was called for a test that is already registered.
    #[error("test '{0}' is already registered")]
    DuplicateRegistration(TestId),

    /// The test has no recorded assignment, or did not request the category.
    #[error(
        "test '{test_id}' has no assignment{}",
        .category.as_ref().map(|c| format!(" for category {c}")).unwrap_or_default()
    )]
    NotFound {
        /// The test that was looked up.
        test_id: TestId,
        /// The category that was looked up, if any.
        category: Option<String>,
    },

    /// A requested category has no pool in this registry.
    #[error("no pool registered for category {0}")]
    InvalidCategory(String),

    /// A single test requested the same category more than once.
    #[error("test '{test_id}' requested category {category} more than once")]
    DuplicateCategory {
        /// The requesting test.
        test_id: TestId,
        /// The repeated category.
        category: String,
    },

    /// Two pools were registered for the same category while building.
    #[error("a pool for category {0} is already registered")]
    DuplicatePool(String),

    /// The registry has been shut down and accepts no new tests.
    #[error("registry is shut down")]
    ShutDown,

    /// An underlying pool operation failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl RegistryError {
    /// Returns `true` if a bounded acquisition timed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Pool(err) if err.is_exhausted())
    }

    /// Returns `true` if this is a [`NotFound`](Self::NotFound) error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn not_found(test_id: impl Into<TestId>) -> Self {
        Self::NotFound {
            test_id: test_id.into(),
            category: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn not_found_message_mentions_category() {
        let err = RegistryError::NotFound {
            test_id: TestId::from("t1"),
            category: Some("Organizer".into()),
        };
        assert_eq!(
            err.to_string(),
            "test 't1' has no assignment for category Organizer"
        );
        assert_eq!(
            RegistryError::not_found("t2").to_string(),
            "test 't2' has no assignment"
        );
    }

    #[test]
    fn exhausted_is_detected_through_pool_error() {
        let err = RegistryError::from(PoolError::Exhausted {
            category: "Organizer".into(),
            timeout: Duration::from_millis(5),
        });
        assert!(err.is_exhausted());
        assert!(!RegistryError::ShutDown.is_exhausted());
    }
}
