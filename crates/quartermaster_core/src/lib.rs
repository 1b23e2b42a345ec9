//! Logging setup for quartermaster.
//!
//! The library crates only emit `tracing` events and never install a
//! subscriber. Binaries and test harnesses call [`TracingConfig::init`] once
//! at startup to route those events somewhere.
//!
//! - [`TracingConfig`] - Level, format and filter of the installed subscriber
//! - [`TracingFormat`] - Pretty, compact or JSON output
//!
//! # Example
//!
//! ```
//! use quartermaster_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("quartermaster_registry=debug,quartermaster_pool=warn")
//!     .init();
//! ```

mod tracing_config;

pub use tracing_config::{LOG_ENV, LOG_FORMAT_ENV, ParseFormatError, TracingConfig, TracingFormat};
