//! Inventory configuration schema and loaders.

use core::time::Duration;
use std::path::Path;

use hashbrown::HashSet;
use quartermaster_pool::Category;
use quartermaster_registry::{PoolRegistry, RegistryBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ConfigError;

/// One credential in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Public identifier, e.g. a login name.
    pub identifier: String,
    /// Secret paired with the identifier, e.g. a password.
    pub secret: String,
}

/// The resources seeded into one category's pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig<C> {
    /// The category served by this pool.
    pub category: C,
    /// Resources in the order the pool hands them out.
    pub resources: Vec<ResourceConfig>,
}

/// The complete startup configuration of a [`PoolRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig<C> {
    /// Upper bound on every acquisition in milliseconds. Absent waits forever.
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
    /// Per-category inventory.
    pub inventory: Vec<CategoryConfig<C>>,
}

impl<C: Category + DeserializeOwned> RegistryConfig<C> {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown
    /// categories, and a validation error if [`validate`](Self::validate) fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            categories = config.inventory.len(),
            resources = config.resource_count(),
            "inventory loaded"
        );
        Ok(config)
    }
}

impl<C: Category> RegistryConfig<C> {
    /// Checks the inventory for structural mistakes.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicateCategory`] if a category is listed twice
    /// - [`ConfigError::EmptyCategory`] if a category has no resources
    /// - [`ConfigError::DuplicateIdentifier`] if an identifier repeats within a category
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut categories = HashSet::with_capacity(self.inventory.len());

        for entry in &self.inventory {
            if !categories.insert(&entry.category) {
                return Err(ConfigError::DuplicateCategory(entry.category.label()));
            }
            if entry.resources.is_empty() {
                return Err(ConfigError::EmptyCategory(entry.category.label()));
            }

            let mut identifiers = HashSet::with_capacity(entry.resources.len());
            for resource in &entry.resources {
                if !identifiers.insert(resource.identifier.as_str()) {
                    return Err(ConfigError::DuplicateIdentifier {
                        category: entry.category.label(),
                        identifier: resource.identifier.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the configured acquire timeout.
    #[must_use]
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the total number of configured resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.inventory.iter().map(|entry| entry.resources.len()).sum()
    }

    /// Converts the configuration into a registry builder.
    ///
    /// Further pools or hooks can be added before building.
    #[must_use]
    pub fn into_builder(self) -> RegistryBuilder<C> {
        let timeout = self.acquire_timeout();
        self.inventory
            .into_iter()
            .fold(
                PoolRegistry::builder().with_acquire_timeout(timeout),
                |builder, entry| {
                    builder.with_pool(
                        entry.category,
                        entry
                            .resources
                            .into_iter()
                            .map(|resource| (resource.identifier, resource.secret)),
                    )
                },
            )
    }

    /// Validates the configuration and builds a registry from it.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or [`ConfigError::Registry`] if the
    /// registry rejects the inventory.
    pub fn build_registry(self) -> Result<PoolRegistry<C>, ConfigError> {
        self.validate()?;
        Ok(self.into_builder().build()?)
    }
}
