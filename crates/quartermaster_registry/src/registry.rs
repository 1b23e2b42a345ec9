//! The pool registry.
//!
//! [`PoolRegistry`] owns one [`ResourcePool`] per category and records which
//! resources each in-flight test holds.
//!
//! # Test States
//!
//! ```text
//! UNREGISTERED ──begin_test──▶ ASSIGNED ──end_test──▶ UNREGISTERED
//! ```
//!
//! While `begin_test` is still waiting on its pools, the test id is reserved:
//! a second `begin_test` with the same id fails, but lookups and `end_test`
//! report `NotFound` because the test is not `ASSIGNED` yet.
//!
//! # Deadlock Avoidance
//!
//! A test requesting several categories acquires them in ascending category
//! order, the same order for every caller, so no two tests can each hold what
//! the other waits for. Every acquisition also honors the registry's optional
//! timeout. If any acquisition fails, the resources already taken are
//! released before the error is returned.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;
use std::time::Instant;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use parking_lot::RwLock;
use quartermaster_pool::{Category, Resource, ResourceId, ResourcePool};

use crate::hooks::{PoolEvent, RegistryHooks};
use crate::{
    Assignment, InventorySnapshot, RegistryBuilder, RegistryError, ShutdownReport, TestId,
    TestLease,
};

/// Assignment slot of a registered test.
enum Slot<C: Category> {
    /// `begin_test` reserved the id and is still acquiring.
    Acquiring,
    /// All requested resources are held. `grant` tells successive tests
    /// registered under the same id apart.
    Assigned { assignment: Assignment<C>, grant: u64 },
}

/// A finished acquisition whose `TestStarted` event is still pending.
pub(crate) struct Granted<C: Category> {
    pub(crate) test_id: TestId,
    pub(crate) grant: u64,
    resources: Vec<(C, ResourceId)>,
    waited: Duration,
}

/// Routes category requests to pools and manages each test's resource set.
///
/// The registry is explicitly constructed through [`RegistryBuilder`] and
/// shared by reference (or `Arc`) with every worker thread. All methods take
/// `&self`.
///
/// # Example
///
/// ```
/// use quartermaster_registry::PoolRegistry;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// enum Account { Organizer, Participant }
///
/// let registry = PoolRegistry::builder()
///     .with_pool(Account::Organizer, [("login0", "re[g"), ("login1", ",jrd")])
///     .with_pool(Account::Participant, [("login4", "vtnc")])
///     .build()
///     .unwrap();
///
/// registry.begin_test("t1", &[Account::Organizer]).unwrap();
/// let organizer = registry.get_assigned("t1", &Account::Organizer).unwrap();
/// assert_eq!(organizer.identifier(), "login0");
///
/// // Participant was not requested by t1.
/// assert!(registry.get_assigned("t1", &Account::Participant).is_err());
///
/// registry.end_test("t1").unwrap();
/// assert!(registry.get_assigned("t1", &Account::Organizer).is_err());
/// ```
pub struct PoolRegistry<C: Category> {
    pools: HashMap<C, ResourcePool<C>>,
    assignments: RwLock<HashMap<TestId, Slot<C>>>,
    acquire_timeout: Option<Duration>,
    hooks: RegistryHooks<C>,
    shut_down: AtomicBool,
    next_grant: AtomicU64,
}

impl<C: Category> core::fmt::Debug for PoolRegistry<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools.values().collect::<Vec<_>>())
            .field("live_tests", &self.live_tests())
            .field("acquire_timeout", &self.acquire_timeout)
            .finish_non_exhaustive()
    }
}

impl<C: Category> PoolRegistry<C> {
    /// Returns a builder for seeding a new registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder<C> {
        RegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        pools: HashMap<C, ResourcePool<C>>,
        acquire_timeout: Option<Duration>,
    ) -> Self {
        Self {
            pools,
            assignments: RwLock::new(HashMap::new()),
            acquire_timeout,
            hooks: RegistryHooks::new(),
            shut_down: AtomicBool::new(false),
            next_grant: AtomicU64::new(0),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Acquires one resource per requested category and records them under `test_id`.
    ///
    /// Blocks while a requested pool is empty, bounded by the registry's
    /// acquire timeout if one is configured. Either every requested resource
    /// is assigned or none is. If a `TestStarted` observer panics, the test
    /// is ended before the panic propagates.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ShutDown`] if the registry has been shut down
    /// - [`RegistryError::InvalidCategory`] if a category has no pool
    /// - [`RegistryError::DuplicateCategory`] if a category is requested twice
    /// - [`RegistryError::DuplicateRegistration`] if `test_id` is already registered
    /// - [`RegistryError::Pool`] if an acquisition times out (`PoolExhausted`) or
    ///   the pool is closed during the wait
    pub fn begin_test(
        &self,
        test_id: impl Into<TestId>,
        requested: &[C],
    ) -> Result<(), RegistryError> {
        self.lease(test_id, requested).map(TestLease::detach)
    }

    /// Returns the resource assigned to `test_id` for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the test is not assigned or did
    /// not request `category`.
    pub fn get_assigned(
        &self,
        test_id: impl AsRef<str>,
        category: &C,
    ) -> Result<Resource<C>, RegistryError> {
        let test_id = test_id.as_ref();
        let assignments = self.assignments.read();

        match assignments.get(test_id) {
            Some(Slot::Assigned { assignment, .. }) => {
                assignment
                    .get(category)
                    .cloned()
                    .ok_or_else(|| RegistryError::NotFound {
                        test_id: test_id.into(),
                        category: Some(category.label()),
                    })
            }
            Some(Slot::Acquiring) | None => Err(RegistryError::not_found(test_id)),
        }
    }

    /// Returns a copy of the full assignment of `test_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the test is not assigned.
    pub fn assignment(&self, test_id: impl AsRef<str>) -> Result<Assignment<C>, RegistryError> {
        let test_id = test_id.as_ref();
        match self.assignments.read().get(test_id) {
            Some(Slot::Assigned { assignment, .. }) => Ok(assignment.clone()),
            Some(Slot::Acquiring) | None => Err(RegistryError::not_found(test_id)),
        }
    }

    /// Releases every resource held by `test_id` and forgets the test.
    ///
    /// Resources are returned in reverse request order. A second call for
    /// the same test is an error.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if the test is not assigned
    /// - [`RegistryError::Pool`] if a pool rejects a release; the remaining
    ///   resources are still released and the test is still forgotten
    pub fn end_test(&self, test_id: impl AsRef<str>) -> Result<(), RegistryError> {
        let assignment = self.take_assignment(test_id.as_ref(), None)?;
        self.release_assignment(assignment)
    }

    /// Ends `test_id` only while it still holds the assignment numbered `grant`.
    pub(crate) fn end_grant(&self, test_id: &TestId, grant: u64) -> Result<(), RegistryError> {
        let assignment = self.take_assignment(test_id.as_ref(), Some(grant))?;
        self.release_assignment(assignment)
    }

    /// Closes every pool and reports tests that still hold resources.
    ///
    /// Acquisitions blocked in `begin_test` fail with a closed-pool error, a
    /// `begin_test` that finishes acquiring afterwards is rolled back with
    /// [`RegistryError::ShutDown`], and new tests are refused. Tests that are still running can call
    /// `end_test` afterwards; their resources are accounted for normally.
    pub fn shutdown(&self) -> ShutdownReport<C> {
        self.shut_down.store(true, Ordering::SeqCst);
        for pool in self.pools.values() {
            pool.close();
        }

        let mut leaked = self.live_test_ids();
        leaked.sort();

        if leaked.is_empty() {
            tracing::info!("pool registry shut down");
        } else {
            tracing::warn!(leaked = ?leaked, "pool registry shut down with live assignments");
        }

        self.hooks.invoke(&PoolEvent::Shutdown {
            leaked: leaked.clone(),
        });

        ShutdownReport {
            leaked,
            snapshot: self.snapshot(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the hooks notified about lifecycle events.
    #[must_use]
    pub fn hooks(&self) -> &RegistryHooks<C> {
        &self.hooks
    }

    /// Returns the configured acquire timeout, if any.
    #[must_use]
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout
    }

    /// Returns the pool serving `category`, if any.
    #[must_use]
    pub fn pool(&self, category: &C) -> Option<&ResourcePool<C>> {
        self.pools.get(category)
    }

    /// Returns every category with a pool, in no particular order.
    pub fn categories(&self) -> impl Iterator<Item = &C> {
        self.pools.keys()
    }

    /// Returns `true` if `test_id` currently holds an assignment.
    #[must_use]
    pub fn is_assigned(&self, test_id: impl AsRef<str>) -> bool {
        matches!(
            self.assignments.read().get(test_id.as_ref()),
            Some(Slot::Assigned { .. })
        )
    }

    /// Returns the number of tests currently holding an assignment.
    #[must_use]
    pub fn live_tests(&self) -> usize {
        self.assignments
            .read()
            .values()
            .filter(|slot| matches!(slot, Slot::Assigned { .. }))
            .count()
    }

    /// Returns the ids of tests currently holding an assignment.
    #[must_use]
    pub fn live_test_ids(&self) -> Vec<TestId> {
        self.assignments
            .read()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Assigned { .. }))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Captures per-category counters.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot<C> {
        InventorySnapshot {
            pools: self
                .pools
                .iter()
                .map(|(category, pool)| (category.clone(), pool.stats()))
                .collect(),
            live_tests: self.live_tests(),
        }
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Reserves `test_id`, acquires its resources and marks it `ASSIGNED`.
    ///
    /// The `TestStarted` event is left to the caller so that it can guard the
    /// assignment before observers run.
    pub(crate) fn assign(
        &self,
        test_id: TestId,
        requested: &[C],
    ) -> Result<Granted<C>, RegistryError> {
        if self.is_shut_down() {
            return Err(RegistryError::ShutDown);
        }
        self.validate_request(&test_id, requested)?;

        {
            let mut assignments = self.assignments.write();
            if assignments.contains_key(&test_id) {
                return Err(RegistryError::DuplicateRegistration(test_id));
            }
            assignments.insert(test_id.clone(), Slot::Acquiring);
        }

        let started = Instant::now();
        let mut acquired = match self.acquire_all(&test_id, requested) {
            Ok(acquired) => acquired,
            Err(error) => {
                self.assignments.write().remove(&test_id);
                return Err(error);
            }
        };

        // Record in request order; acquisition happened in canonical order.
        let resources: IndexMap<C, Resource<C>> = requested
            .iter()
            .filter_map(|category| {
                acquired
                    .remove(category)
                    .map(|resource| (category.clone(), resource))
            })
            .collect();
        let assignment = Assignment::new(test_id.clone(), resources);
        let resources = pairs(assignment.iter());
        let waited = started.elapsed();
        let grant = self.promote(assignment)?;

        Ok(Granted {
            test_id,
            grant,
            resources,
            waited,
        })
    }

    /// Moves a reserved test to `ASSIGNED`.
    ///
    /// A test that finished acquiring after [`shutdown`](Self::shutdown) is
    /// rolled back instead. The flag is read under the assignment lock, so a
    /// test is either in the shutdown's leak report or never assigned.
    fn promote(&self, assignment: Assignment<C>) -> Result<u64, RegistryError> {
        let test_id = assignment.test_id().clone();
        let mut assignments = self.assignments.write();

        if self.is_shut_down() {
            assignments.remove(&test_id);
            drop(assignments);
            let error = RegistryError::ShutDown;
            let acquired = assignment.into_resources().into_iter().collect();
            self.roll_back(&test_id, acquired, &error);
            return Err(error);
        }

        let grant = self.next_grant.fetch_add(1, Ordering::Relaxed);
        assignments.insert(test_id, Slot::Assigned { assignment, grant });
        Ok(grant)
    }

    pub(crate) fn notify_started(&self, granted: Granted<C>) {
        let Granted {
            test_id,
            resources,
            waited,
            ..
        } = granted;
        tracing::info!(test_id = %test_id, resources = ?resources, ?waited, "test started");
        self.hooks.invoke(&PoolEvent::TestStarted {
            test_id,
            resources,
            waited,
        });
    }

    /// Removes the assignment of `test_id`, optionally only if it carries `grant`.
    fn take_assignment(
        &self,
        test_id: &str,
        grant: Option<u64>,
    ) -> Result<Assignment<C>, RegistryError> {
        let mut assignments = self.assignments.write();
        let current = matches!(
            assignments.get(test_id),
            Some(Slot::Assigned { grant: held, .. }) if grant.is_none_or(|wanted| wanted == *held)
        );
        if !current {
            return Err(RegistryError::not_found(test_id));
        }
        match assignments.remove(test_id) {
            Some(Slot::Assigned { assignment, .. }) => Ok(assignment),
            Some(Slot::Acquiring) | None => Err(RegistryError::not_found(test_id)),
        }
    }

    fn release_assignment(&self, assignment: Assignment<C>) -> Result<(), RegistryError> {
        let test_id = assignment.test_id().clone();
        let mut released = Vec::with_capacity(assignment.len());
        let mut first_error = None;

        for (category, resource) in assignment.into_resources().into_iter().rev() {
            let id = resource.id();
            match self.release(&category, resource) {
                Ok(()) => released.push((category, id)),
                Err(error) => {
                    tracing::warn!(
                        test_id = %test_id,
                        category = ?category,
                        %error,
                        "release failed"
                    );
                    first_error.get_or_insert(error);
                }
            }
        }

        tracing::info!(test_id = %test_id, resources = ?released, "test ended");
        self.hooks.invoke(&PoolEvent::TestEnded { test_id, released });

        first_error.map_or(Ok(()), Err)
    }

    fn validate_request(&self, test_id: &TestId, requested: &[C]) -> Result<(), RegistryError> {
        let mut seen = HashSet::with_capacity(requested.len());
        for category in requested {
            if !self.pools.contains_key(category) {
                return Err(RegistryError::InvalidCategory(category.label()));
            }
            if !seen.insert(category) {
                return Err(RegistryError::DuplicateCategory {
                    test_id: test_id.clone(),
                    category: category.label(),
                });
            }
        }
        Ok(())
    }

    /// Acquires every requested category in canonical order, rolling back on failure.
    fn acquire_all(
        &self,
        test_id: &TestId,
        requested: &[C],
    ) -> Result<HashMap<C, Resource<C>>, RegistryError> {
        let mut order: Vec<&C> = requested.iter().collect();
        order.sort();

        let mut acquired: Vec<(C, Resource<C>)> = Vec::with_capacity(order.len());

        for category in order {
            let result = match self.pools.get(category) {
                Some(pool) => pool.acquire(self.acquire_timeout).map_err(RegistryError::from),
                None => Err(RegistryError::InvalidCategory(category.label())),
            };

            match result {
                Ok(resource) => acquired.push((category.clone(), resource)),
                Err(error) => {
                    self.roll_back(test_id, acquired, &error);
                    return Err(error);
                }
            }
        }

        Ok(acquired.into_iter().collect())
    }

    fn roll_back(&self, test_id: &TestId, acquired: Vec<(C, Resource<C>)>, error: &RegistryError) {
        let mut released = Vec::with_capacity(acquired.len());

        for (category, resource) in acquired.into_iter().rev() {
            let id = resource.id();
            match self.release(&category, resource) {
                Ok(()) => released.push((category, id)),
                Err(release_error) => {
                    tracing::warn!(
                        test_id = %test_id,
                        category = ?category,
                        error = %release_error,
                        "rollback release failed"
                    );
                }
            }
        }

        tracing::warn!(test_id = %test_id, %error, released = ?released, "test start rolled back");
        self.hooks.invoke(&PoolEvent::AcquireRolledBack {
            test_id: test_id.clone(),
            released,
            error: error.clone(),
        });
    }

    fn release(&self, category: &C, resource: Resource<C>) -> Result<(), RegistryError> {
        let pool = self
            .pools
            .get(category)
            .ok_or_else(|| RegistryError::InvalidCategory(category.label()))?;
        pool.release(resource)?;
        Ok(())
    }
}

fn pairs<'a, C: Category>(
    resources: impl Iterator<Item = (&'a C, &'a Resource<C>)>,
) -> Vec<(C, ResourceId)> {
    resources
        .map(|(category, resource)| (category.clone(), resource.id()))
        .collect()
}
