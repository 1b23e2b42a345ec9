//! Unified event enum for registry hooks.
//!
//! All hooks receive `&PoolEvent<C>` and can match on variants for typed access.
//!
//! # Example
//!
//! ```
//! use quartermaster_registry::hooks::PoolEvent;
//!
//! fn handle_event(event: &PoolEvent<&'static str>) {
//!     match event {
//!         PoolEvent::TestStarted { test_id, waited, .. } => {
//!             println!("{test_id} got its accounts after {waited:?}");
//!         }
//!         PoolEvent::TestEnded { released, .. } => {
//!             println!("returned {} accounts", released.len());
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use core::time::Duration;

use quartermaster_pool::{Category, ResourceId};

use crate::{RegistryError, TestId};

/// Discriminant of a [`PoolEvent`], used to subscribe to a subset of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`PoolEvent::TestStarted`].
    TestStarted,
    /// See [`PoolEvent::AcquireRolledBack`].
    AcquireRolledBack,
    /// See [`PoolEvent::TestEnded`].
    TestEnded,
    /// See [`PoolEvent::Shutdown`].
    Shutdown,
}

impl EventKind {
    /// Every event kind.
    pub const ALL: [EventKind; 4] = [
        EventKind::TestStarted,
        EventKind::AcquireRolledBack,
        EventKind::TestEnded,
        EventKind::Shutdown,
    ];
}

/// Event emitted by a [`PoolRegistry`](crate::PoolRegistry) as tests move
/// through their lifecycle.
#[derive(Debug, Clone)]
pub enum PoolEvent<C: Category> {
    /// A test received every resource it requested.
    TestStarted {
        /// The started test.
        test_id: TestId,
        /// Granted resources, in request order.
        resources: Vec<(C, ResourceId)>,
        /// Time spent waiting for all acquisitions.
        waited: Duration,
    },

    /// Acquisition for a test failed and partial acquisitions were returned.
    AcquireRolledBack {
        /// The test whose start failed.
        test_id: TestId,
        /// Resources that had been acquired and were released again.
        released: Vec<(C, ResourceId)>,
        /// The failure that triggered the rollback.
        error: RegistryError,
    },

    /// A test ended and its resources went back to their pools.
    TestEnded {
        /// The finished test.
        test_id: TestId,
        /// Released resources, in release order.
        released: Vec<(C, ResourceId)>,
    },

    /// The registry was shut down.
    Shutdown {
        /// Tests that still held resources at shutdown.
        leaked: Vec<TestId>,
    },
}

impl<C: Category> PoolEvent<C> {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::TestStarted { .. } => EventKind::TestStarted,
            Self::AcquireRolledBack { .. } => EventKind::AcquireRolledBack,
            Self::TestEnded { .. } => EventKind::TestEnded,
            Self::Shutdown { .. } => EventKind::Shutdown,
        }
    }

    /// Returns the test this event is about, if any.
    #[must_use]
    pub fn test_id(&self) -> Option<&TestId> {
        match self {
            Self::TestStarted { test_id, .. }
            | Self::AcquireRolledBack { test_id, .. }
            | Self::TestEnded { test_id, .. } => Some(test_id),
            Self::Shutdown { .. } => None,
        }
    }
}
