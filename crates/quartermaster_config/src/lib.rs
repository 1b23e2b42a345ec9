//! Inventory configuration for quartermaster (Layer 3).
//!
//! The initial inventory of a [`PoolRegistry`] is a startup input. This crate
//! reads it from JSON so it does not have to be hardcoded:
//!
//! ```json
//! {
//!   "acquire_timeout_ms": 30000,
//!   "inventory": [
//!     { "category": "ORGANIZER",
//!       "resources": [ { "identifier": "login0", "secret": "re[g" } ] }
//!   ]
//! }
//! ```
//!
//! The category type is any [`Category`] that also implements
//! [`serde::Deserialize`]: a closed enum rejects unknown categories while
//! parsing, a `String` accepts any label.
//!
//! # Example
//!
//! ```
//! use quartermaster_config::RegistryConfig;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
//! #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
//! enum Account { Organizer, Participant }
//!
//! let config: RegistryConfig<Account> = RegistryConfig::from_json_str(r#"{
//!     "inventory": [
//!         { "category": "ORGANIZER", "resources": [ { "identifier": "login0", "secret": "re[g" } ] },
//!         { "category": "PARTICIPANT", "resources": [ { "identifier": "login4", "secret": "vtnc" } ] }
//!     ]
//! }"#).unwrap();
//!
//! let registry = config.build_registry().unwrap();
//! registry.begin_test("t1", &[Account::Participant]).unwrap();
//! assert_eq!(registry.get_assigned("t1", &Account::Participant).unwrap().identifier(), "login4");
//! ```

mod config;
mod error;

pub use config::{CategoryConfig, RegistryConfig, ResourceConfig};
pub use error::ConfigError;

#[cfg(doc)]
use quartermaster_pool::Category;
#[cfg(doc)]
use quartermaster_registry::PoolRegistry;
