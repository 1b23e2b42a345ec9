//! Per-test resource assignment for quartermaster (Layer 2).
//!
//! `quartermaster_registry` routes category requests to the pools of
//! `quartermaster_pool` and tracks which resources each in-flight test holds:
//!
//! - [`PoolRegistry`] - Owns one pool per category and every live [`Assignment`]
//! - [`RegistryBuilder`] - Seeds the fixed inventory at startup
//! - [`TestId`] - Unique key of one test's lifecycle
//! - [`TestLease`] - Scoped assignment released on drop
//! - [`TestLifecycle`] - Callbacks driven by a test-execution engine
//! - [`hooks`] - Observers notified about lifecycle events
//!
//! # Test Lifecycle
//!
//! ```text
//! begin_test(id, [categories])   acquire one resource per category
//!         │
//!         ▼
//! get_assigned(id, category)     read the granted resource (any number of times)
//!         │
//!         ▼
//! end_test(id)                   return every resource to its pool
//! ```
//!
//! # Example
//!
//! ```
//! use quartermaster_registry::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
//! enum Account { Organizer, Participant }
//!
//! let registry = PoolRegistry::builder()
//!     .with_pool(Account::Organizer, [("login0", "re[g"), ("login1", ",jrd")])
//!     .with_pool(Account::Participant, [("login4", "vtnc"), ("login5", "rjrc")])
//!     .build()
//!     .unwrap();
//!
//! let login = registry
//!     .run_test("checkout", &[Account::Organizer, Account::Participant], |assignment| {
//!         let organizer = assignment.get(&Account::Organizer).unwrap();
//!         format!("{}:{}", organizer.identifier(), organizer.secret())
//!     })
//!     .unwrap();
//!
//! assert_eq!(login, "login0:re[g");
//! assert!(registry.snapshot().is_closed_world());
//! ```

mod assignment;
mod builder;
mod error;
pub mod hooks;
mod lease;
mod lifecycle;
mod registry;
mod snapshot;
mod test_id;

pub use assignment::Assignment;
pub use builder::RegistryBuilder;
pub use error::RegistryError;
pub use lease::TestLease;
pub use lifecycle::TestLifecycle;
pub use registry::PoolRegistry;
pub use snapshot::{InventorySnapshot, ShutdownReport};
pub use test_id::TestId;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::hooks::{EventKind, PoolEvent, RegistryHooks};
    pub use crate::{
        Assignment, InventorySnapshot, PoolRegistry, RegistryBuilder, RegistryError,
        ShutdownReport, TestId, TestLease, TestLifecycle,
    };
    pub use quartermaster_pool::prelude::*;
}
