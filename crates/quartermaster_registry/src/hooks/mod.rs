//! Lifecycle hooks for registry observability.
//!
//! Observers registered on a registry's [`RegistryHooks`] are told when a
//! test receives its resources, when an acquisition is rolled back, when a
//! test returns its resources, and when the registry shuts down.
//!
//! - **Events** ([`events`]): [`PoolEvent`] enum carrying context to hooks
//! - **API** ([`api`]): Registration and invocation mechanism
//!
//! Hooks execute in registration order.

pub mod api;
pub mod events;

pub use api::{HookRegistrationError, RegistryHooks};
pub use events::{EventKind, PoolEvent};
