//! Registry construction.

use core::time::Duration;
use std::sync::Arc;

use hashbrown::HashMap;
use quartermaster_pool::{Category, Resource, ResourcePool};

use crate::{PoolRegistry, RegistryError};

/// Builder seeding a [`PoolRegistry`] with its fixed inventory.
///
/// The inventory is an explicit startup input: one entry per category,
/// each with the `(identifier, secret)` pairs that pool will circulate.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use quartermaster_registry::PoolRegistry;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// enum Account { Organizer, Participant }
///
/// let registry = PoolRegistry::builder()
///     .with_pool(Account::Organizer, [("login0", "re[g"), ("login1", ",jrd")])
///     .with_pool(Account::Participant, [("login4", "vtnc")])
///     .with_acquire_timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.categories().count(), 2);
/// ```
#[derive(Debug)]
pub struct RegistryBuilder<C: Category> {
    inventory: Vec<(C, Vec<Resource<C>>)>,
    acquire_timeout: Option<Duration>,
}

impl<C: Category> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self {
            inventory: Vec::new(),
            acquire_timeout: None,
        }
    }
}

impl<C: Category> RegistryBuilder<C> {
    /// Creates an empty builder. Acquisitions wait forever unless a timeout is set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pool for `category` seeded with `(identifier, secret)` pairs, in order.
    #[must_use]
    pub fn with_pool<I, S, T>(self, category: C, seeds: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<Arc<str>>,
        T: Into<Arc<str>>,
    {
        let resources: Vec<_> = seeds
            .into_iter()
            .map(|(identifier, secret)| Resource::new(category.clone(), identifier, secret))
            .collect();
        self.with_resources(category, resources)
    }

    /// Adds a pool for `category` seeded with already-built resources.
    #[must_use]
    pub fn with_resources(
        mut self,
        category: C,
        resources: impl IntoIterator<Item = Resource<C>>,
    ) -> Self {
        self.inventory
            .push((category, resources.into_iter().collect()));
        self
    }

    /// Bounds every acquisition; `None` waits forever.
    ///
    /// With a bound, a test whose category stays exhausted for longer than
    /// `timeout` fails with a `PoolExhausted` error instead of blocking.
    #[must_use]
    pub fn with_acquire_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.acquire_timeout = timeout.into();
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicatePool`] if a category was added twice
    /// - [`RegistryError::Pool`] if a pool rejects its seed (wrong category,
    ///   duplicate resource)
    pub fn build(self) -> Result<PoolRegistry<C>, RegistryError> {
        let mut pools = HashMap::with_capacity(self.inventory.len());

        for (category, resources) in self.inventory {
            if pools.contains_key(&category) {
                return Err(RegistryError::DuplicatePool(category.label()));
            }
            let pool = ResourcePool::new(category.clone(), resources)?;
            pools.insert(category, pool);
        }

        tracing::info!(
            categories = pools.len(),
            acquire_timeout = ?self.acquire_timeout,
            "pool registry built"
        );

        Ok(PoolRegistry::from_parts(pools, self.acquire_timeout))
    }
}
