//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use quartermaster_registry::RegistryError;

/// Errors that can occur while loading or applying an inventory configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read inventory from {}: {source}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid JSON or does not match the schema.
    #[error("invalid inventory configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same category is listed more than once.
    #[error("category {0} is configured more than once")]
    DuplicateCategory(String),

    /// A category has no resources, so every request for it would block.
    #[error("category {0} has no resources")]
    EmptyCategory(String),

    /// Two resources in one category share an identifier.
    #[error("identifier '{identifier}' appears more than once in category {category}")]
    DuplicateIdentifier {
        /// The category holding the duplicate.
        category: String,
        /// The repeated identifier.
        identifier: String,
    },

    /// The registry rejected the inventory.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
