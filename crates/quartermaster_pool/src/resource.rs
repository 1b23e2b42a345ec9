//! Pooled resources and their identities.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::Category;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identity of a [`Resource`].
///
/// Identities are allocated from a process-wide counter when a resource is
/// created, so two resources never share an id even when their identifiers
/// and secrets are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value of this id.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res_{}", self.0)
    }
}

/// An interchangeable unit of capacity, such as a test account.
///
/// Resources are immutable once created. Cloning is cheap (reference count
/// bumps only) and yields a value with the same [`ResourceId`]; pools use
/// that id to reject releases of resources they did not hand out.
///
/// The `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Resource<C> {
    id: ResourceId,
    category: C,
    identifier: Arc<str>,
    secret: Arc<str>,
}

impl<C: Category> Resource<C> {
    /// Creates a resource with a fresh identity.
    #[must_use]
    pub fn new(category: C, identifier: impl Into<Arc<str>>, secret: impl Into<Arc<str>>) -> Self {
        Self {
            id: ResourceId::next(),
            category,
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Returns the opaque identity of this resource.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the category this resource belongs to.
    #[must_use]
    pub fn category(&self) -> &C {
        &self.category
    }

    /// Returns the public identifier (e.g. a login).
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the secret (e.g. a password).
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl<C: fmt::Debug> fmt::Debug for Resource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_ids_are_unique() {
        let a = Resource::new("organizer", "login0", "re[g");
        let b = Resource::new("organizer", "login0", "re[g");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn clone_keeps_identity() {
        let a = Resource::new("organizer", "login0", "re[g");
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn debug_redacts_secret() {
        let resource = Resource::new("participant", "login4", "vtnc");
        let rendered = format!("{resource:?}");
        assert!(rendered.contains("login4"));
        assert!(!rendered.contains("vtnc"));
    }

    #[test]
    fn resource_id_display() {
        let resource = Resource::new(0_u8, "a", "b");
        assert_eq!(
            resource.id().to_string(),
            format!("res_{}", resource.id().as_u64())
        );
    }
}
