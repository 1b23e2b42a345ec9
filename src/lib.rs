//! Typed concurrent pools of test resources with per-test checkout and return.
//!
//! Resources (such as test-account credentials) are partitioned into
//! categories. Each in-flight test receives one resource per category it
//! requests and hands them back when it ends.
//!
//! ```
//! use quartermaster::prelude::*;
//!
//! let registry = PoolRegistry::builder()
//!     .with_pool("ORGANIZER", [("login0", "re[g"), ("login1", ",jrd")])
//!     .build()
//!     .unwrap();
//!
//! let lease = registry.lease("t1", &["ORGANIZER"]).unwrap();
//! assert_eq!(lease.get(&"ORGANIZER").unwrap().identifier(), "login0");
//! ```

pub use quartermaster_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use quartermaster_internal::prelude::*;
}
