//! # Quartermaster Internal Library
//!
//! Re-exports the core quartermaster crates for convenience.

/// Layer 1: Per-category resource pools.
pub use quartermaster_pool;

/// Layer 2: Per-test resource assignment.
pub use quartermaster_registry;

/// Layer 3: Inventory configuration.
pub use quartermaster_config;

/// Logging setup.
#[cfg(feature = "subscriber")]
pub use quartermaster_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use quartermaster_config::{ConfigError, RegistryConfig};
    #[cfg(feature = "subscriber")]
    pub use quartermaster_core::{TracingConfig, TracingFormat};
    pub use quartermaster_registry::prelude::*;
}
