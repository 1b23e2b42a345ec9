//! Inventory snapshots and shutdown reports.

use std::collections::BTreeMap;

use quartermaster_pool::{Category, PoolStats};

use crate::TestId;

/// Per-category pool counters captured at one moment.
///
/// Each category's counters are read under that pool's lock, so they are
/// internally consistent; different categories may be read at slightly
/// different instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot<C: Category> {
    pub(crate) pools: BTreeMap<C, PoolStats>,
    pub(crate) live_tests: usize,
}

impl<C: Category> InventorySnapshot<C> {
    /// Returns the counters for `category`, if it has a pool.
    #[must_use]
    pub fn get(&self, category: &C) -> Option<PoolStats> {
        self.pools.get(category).copied()
    }

    /// Returns `(category, counters)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&C, &PoolStats)> {
        self.pools.iter()
    }

    /// Returns the number of tests holding an assignment.
    #[must_use]
    pub fn live_tests(&self) -> usize {
        self.live_tests
    }

    /// Returns the total number of checked-out resources across categories.
    #[must_use]
    pub fn checked_out(&self) -> usize {
        self.pools.values().map(|stats| stats.checked_out).sum()
    }

    /// Returns `true` if every pool satisfies `available + checked_out == capacity`.
    #[must_use]
    pub fn is_closed_world(&self) -> bool {
        self.pools.values().all(PoolStats::is_closed_world)
    }
}

/// Outcome of [`PoolRegistry::shutdown`](crate::PoolRegistry::shutdown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport<C: Category> {
    /// Tests that still held resources when the registry shut down.
    pub leaked: Vec<TestId>,
    /// Inventory at shutdown.
    pub snapshot: InventorySnapshot<C>,
}

impl<C: Category> ShutdownReport<C> {
    /// Returns `true` if every resource was back in its pool.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.leaked.is_empty() && self.snapshot.checked_out() == 0
    }
}
