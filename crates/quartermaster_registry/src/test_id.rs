//! Test identifiers.

use core::borrow::Borrow;
use core::fmt;
use std::sync::Arc;

/// Unique key correlating one test's lifecycle (start → use → end).
///
/// Identifiers are supplied by the test-execution engine and must be unique
/// among concurrently running tests. Callers without a stable identifier can
/// use [`TestId::generate`], which produces a nanoid.
///
/// Internally uses `Arc<str>` for cheap cloning (reference count bump only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(Arc<str>);

impl TestId {
    /// Creates a test ID from a specific string value.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Creates a new test ID with a unique nanoid.
    #[must_use]
    pub fn generate() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TestId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for TestId {
    fn from(id: String) -> Self {
        Self(id.into())
    }
}

impl From<&TestId> for TestId {
    fn from(id: &TestId) -> Self {
        id.clone()
    }
}
