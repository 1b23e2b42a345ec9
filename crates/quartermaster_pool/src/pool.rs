//! Single-category resource pool.
//!
//! A [`ResourcePool`] holds the circulating inventory for exactly one
//! category. Resources leave the pool on acquisition and come back on
//! release; the pool never creates or destroys them.
//!
//! # Thread Safety
//!
//! All state sits behind one `parking_lot::Mutex`, paired with a `Condvar`
//! that blocked acquirers park on. Every push and pop is linearizable and
//! callers never need an external lock.
//!
//! # Inventory Closure
//!
//! The pool records the id of every resource it hands out. A release is only
//! accepted for a resource that is currently checked out, so
//! `available() + checked_out() == capacity()` holds at every point where
//! the lock is not held.

use core::fmt;
use core::time::Duration;
use std::collections::VecDeque;
use std::time::Instant;

use hashbrown::HashSet;
use parking_lot::{Condvar, Mutex};

use crate::{Category, PoolError, Resource, ResourceId};

/// Mutable pool state guarded by the pool mutex.
struct PoolState<C> {
    /// Resources ready to be handed out, oldest release first.
    idle: VecDeque<Resource<C>>,
    /// Ids of resources currently held by callers.
    checked_out: HashSet<ResourceId>,
    /// Once set, acquisitions fail with [`PoolError::Closed`].
    closed: bool,
}

impl<C: Category> PoolState<C> {
    fn take(&mut self) -> Option<Resource<C>> {
        let resource = self.idle.pop_front()?;
        self.checked_out.insert(resource.id());
        Some(resource)
    }
}

/// Point-in-time counters of a [`ResourcePool`], read under a single lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Fixed inventory size.
    pub capacity: usize,
    /// Resources currently in the pool.
    pub available: usize,
    /// Resources currently held by callers.
    pub checked_out: usize,
}

impl PoolStats {
    /// Returns `true` if `available + checked_out == capacity`.
    #[must_use]
    pub fn is_closed_world(&self) -> bool {
        self.available + self.checked_out == self.capacity
    }
}

/// Thread-safe FIFO inventory of interchangeable resources for one category.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use quartermaster_pool::{PoolError, Resource, ResourcePool};
///
/// let pool = ResourcePool::new("organizer", [Resource::new("organizer", "login0", "re[g")])
///     .unwrap();
///
/// let held = pool.acquire_blocking().unwrap();
///
/// // The pool is empty now, so a bounded wait fails.
/// let err = pool.acquire_timeout(Duration::from_millis(10)).unwrap_err();
/// assert!(matches!(err, PoolError::Exhausted { .. }));
///
/// pool.release(held).unwrap();
/// assert!(pool.try_acquire().is_some());
/// ```
pub struct ResourcePool<C: Category> {
    category: C,
    capacity: usize,
    state: Mutex<PoolState<C>>,
    released: Condvar,
}

impl<C: Category> fmt::Debug for ResourcePool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResourcePool")
            .field("category", &self.category)
            .field("capacity", &self.capacity)
            .field("available", &state.idle.len())
            .field("checked_out", &state.checked_out.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<C: Category> ResourcePool<C> {
    /// Creates a pool seeded with the given inventory, in order.
    ///
    /// # Errors
    ///
    /// - [`PoolError::CategoryMismatch`] if a resource belongs to another category
    /// - [`PoolError::DuplicateResource`] if the same resource appears twice
    pub fn new(
        category: C,
        resources: impl IntoIterator<Item = Resource<C>>,
    ) -> Result<Self, PoolError> {
        let mut idle = VecDeque::new();
        let mut seen = HashSet::new();

        for resource in resources {
            if resource.category() != &category {
                return Err(PoolError::CategoryMismatch {
                    expected: category.label(),
                    found: resource.category().label(),
                });
            }
            if !seen.insert(resource.id()) {
                return Err(PoolError::DuplicateResource {
                    category: category.label(),
                    resource: resource.id(),
                });
            }
            idle.push_back(resource);
        }

        let capacity = idle.len();
        tracing::debug!(category = ?category, capacity, "resource pool seeded");

        Ok(Self {
            category,
            capacity,
            state: Mutex::new(PoolState {
                idle,
                checked_out: HashSet::new(),
                closed: false,
            }),
            released: Condvar::new(),
        })
    }

    /// Returns the category served by this pool.
    #[must_use]
    pub fn category(&self) -> &C {
        &self.category
    }

    /// Returns the fixed inventory size of this pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of resources currently in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Returns the number of resources currently checked out.
    #[must_use]
    pub fn checked_out(&self) -> usize {
        self.state.lock().checked_out.len()
    }

    /// Returns all counters at once, consistent with each other.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            capacity: self.capacity,
            available: state.idle.len(),
            checked_out: state.checked_out.len(),
        }
    }

    /// Returns the ids of resources currently in the pool, in hand-out order.
    #[must_use]
    pub fn idle_ids(&self) -> Vec<ResourceId> {
        self.state.lock().idle.iter().map(Resource::id).collect()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Removes and returns a resource, waiting as long as the pool is empty.
    ///
    /// Resources are handed out in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] if the pool is closed before a resource
    /// becomes available.
    pub fn acquire_blocking(&self) -> Result<Resource<C>, PoolError> {
        self.acquire_until(None)
    }

    /// Removes and returns a resource, waiting at most `timeout`.
    ///
    /// A timeout too large to express as a deadline waits without bound.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Exhausted`] if no resource was released in time
    /// - [`PoolError::Closed`] if the pool is closed
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<Resource<C>, PoolError> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.acquire_until(Some((deadline, timeout))),
            None => self.acquire_until(None),
        }
    }

    /// Acquires with an optional bound: `None` waits forever.
    ///
    /// # Errors
    ///
    /// See [`acquire_blocking`](Self::acquire_blocking) and
    /// [`acquire_timeout`](Self::acquire_timeout).
    pub fn acquire(&self, timeout: Option<Duration>) -> Result<Resource<C>, PoolError> {
        match timeout {
            Some(timeout) => self.acquire_timeout(timeout),
            None => self.acquire_blocking(),
        }
    }

    /// Removes and returns a resource if one is immediately available.
    ///
    /// Returns `None` if the pool is empty or closed.
    #[must_use]
    pub fn try_acquire(&self) -> Option<Resource<C>> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.take()
    }

    fn acquire_until(
        &self,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<Resource<C>, PoolError> {
        let started = Instant::now();
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return Err(PoolError::Closed {
                    category: self.category.label(),
                });
            }

            if let Some(resource) = state.take() {
                tracing::debug!(
                    category = ?self.category,
                    resource = %resource.id(),
                    waited = ?started.elapsed(),
                    "resource acquired"
                );
                return Ok(resource);
            }

            match deadline {
                None => self.released.wait(&mut state),
                Some((deadline, timeout)) => {
                    let timed_out = self.released.wait_until(&mut state, deadline).timed_out();
                    // A release may land between the timeout and reacquiring the lock.
                    if timed_out && state.idle.is_empty() && !state.closed {
                        tracing::warn!(
                            category = ?self.category,
                            ?timeout,
                            "resource pool exhausted"
                        );
                        return Err(PoolError::Exhausted {
                            category: self.category.label(),
                            timeout,
                        });
                    }
                }
            }
        }
    }

    /// Returns a resource to the pool and wakes one waiting acquirer.
    ///
    /// Releasing into a closed pool is allowed so that outstanding
    /// resources can still be accounted for during shutdown.
    ///
    /// # Errors
    ///
    /// - [`PoolError::CategoryMismatch`] if the resource belongs to another category
    /// - [`PoolError::NotCheckedOut`] if this pool did not hand the resource out,
    ///   or it has already been released
    pub fn release(&self, resource: Resource<C>) -> Result<(), PoolError> {
        if resource.category() != &self.category {
            return Err(PoolError::CategoryMismatch {
                expected: self.category.label(),
                found: resource.category().label(),
            });
        }

        let mut state = self.state.lock();
        if !state.checked_out.remove(&resource.id()) {
            return Err(PoolError::NotCheckedOut {
                category: self.category.label(),
                resource: resource.id(),
            });
        }

        tracing::debug!(category = ?self.category, resource = %resource.id(), "resource released");
        state.idle.push_back(resource);
        drop(state);

        self.released.notify_one();
        Ok(())
    }

    /// Closes the pool and wakes every waiting acquirer.
    ///
    /// Subsequent and pending acquisitions fail with [`PoolError::Closed`].
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);

        tracing::debug!(category = ?self.category, "resource pool closed");
        self.released.notify_all();
    }
}
