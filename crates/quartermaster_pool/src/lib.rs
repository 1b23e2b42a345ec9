//! Per-category resource pools for quartermaster (Layer 1).
//!
//! `quartermaster_pool` provides the leaf primitives of the checkout model:
//!
//! - [`Category`] - Tag partitioning resources into disjoint pools
//! - [`Resource`] - An immutable, interchangeable credential with an opaque identity
//! - [`ResourcePool`] - Thread-safe FIFO inventory for exactly one category
//! - [`PoolStats`] - Consistent snapshot of a pool's counters
//! - [`PoolError`] - Errors raised by pool operations
//!
//! # Architecture
//!
//! This crate is Layer 1 of the quartermaster architecture:
//!
//! - **Layer 1** (`quartermaster_pool`): single-category pools (this crate)
//! - **Layer 2** (`quartermaster_registry`): per-test multi-category assignments
//! - **Layer 3** (`quartermaster_config`, `quartermaster_core`): inventory loading and logging
//!
//! # Example
//!
//! ```
//! use quartermaster_pool::{Resource, ResourcePool};
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Account { Organizer }
//!
//! let pool = ResourcePool::new(
//!     Account::Organizer,
//!     [
//!         Resource::new(Account::Organizer, "login0", "re[g"),
//!         Resource::new(Account::Organizer, "login1", ",jrd"),
//!     ],
//! )
//! .unwrap();
//!
//! let account = pool.acquire_blocking().unwrap();
//! assert_eq!(account.identifier(), "login0");
//! assert_eq!(pool.available(), 1);
//!
//! pool.release(account).unwrap();
//! assert_eq!(pool.available(), 2);
//! ```

mod category;
mod error;
mod pool;
mod resource;

pub use category::Category;
pub use error::PoolError;
pub use pool::{PoolStats, ResourcePool};
pub use resource::{Resource, ResourceId};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{Category, PoolError, PoolStats, Resource, ResourceId, ResourcePool};
}
