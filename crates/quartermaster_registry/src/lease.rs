//! Scoped test assignments.
//!
//! A [`TestLease`] ties `end_test` to a lexical scope: the resources go back
//! to their pools when the lease is dropped, including during unwinding.

use quartermaster_pool::{Category, Resource};

use crate::{Assignment, PoolRegistry, RegistryError, TestId};

/// An active test assignment that ends itself when dropped.
///
/// Created by [`PoolRegistry::lease`]. Use [`end`](Self::end) to observe
/// release errors; a dropped lease logs them instead.
///
/// A lease only ends the assignment it was created with. If the test was
/// ended through the registry and its id registered again, the new test is
/// left alone.
#[must_use = "dropping a lease ends the test immediately"]
#[derive(Debug)]
pub struct TestLease<'r, C: Category> {
    registry: &'r PoolRegistry<C>,
    test_id: TestId,
    grant: u64,
    ended: bool,
}

impl<C: Category> TestLease<'_, C> {
    /// Returns the test this lease belongs to.
    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    /// Returns the resource assigned for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `category` was not requested.
    pub fn get(&self, category: &C) -> Result<Resource<C>, RegistryError> {
        self.registry.get_assigned(&self.test_id, category)
    }

    /// Returns a copy of the full assignment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the test was ended out from
    /// under the lease through the registry.
    pub fn assignment(&self) -> Result<Assignment<C>, RegistryError> {
        self.registry.assignment(&self.test_id)
    }

    /// Ends the test now and reports the outcome.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`PoolRegistry::end_test`]. Returns
    /// [`RegistryError::NotFound`] if the assignment was already ended.
    pub fn end(mut self) -> Result<(), RegistryError> {
        self.ended = true;
        self.registry.end_grant(&self.test_id, self.grant)
    }

    /// Gives up the lease without ending the test.
    pub(crate) fn detach(mut self) {
        self.ended = true;
    }
}

impl<C: Category> Drop for TestLease<'_, C> {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        if let Err(error) = self.registry.end_grant(&self.test_id, self.grant) {
            tracing::warn!(test_id = %self.test_id, %error, "failed to end leased test");
        }
    }
}

impl<C: Category> PoolRegistry<C> {
    /// Starts a test and returns a lease that ends it on drop.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`begin_test`](Self::begin_test).
    ///
    /// # Example
    ///
    /// ```
    /// use quartermaster_registry::PoolRegistry;
    ///
    /// let registry = PoolRegistry::builder()
    ///     .with_pool("organizer", [("login0", "re[g")])
    ///     .build()
    ///     .unwrap();
    ///
    /// {
    ///     let lease = registry.lease("t1", &["organizer"]).unwrap();
    ///     assert_eq!(lease.get(&"organizer").unwrap().identifier(), "login0");
    /// }
    ///
    /// assert_eq!(registry.snapshot().checked_out(), 0);
    /// ```
    pub fn lease(
        &self,
        test_id: impl Into<TestId>,
        requested: &[C],
    ) -> Result<TestLease<'_, C>, RegistryError> {
        let granted = self.assign(test_id.into(), requested)?;
        let lease = TestLease {
            registry: self,
            test_id: granted.test_id.clone(),
            grant: granted.grant,
            ended: false,
        };
        // A panicking observer unwinds through `lease`, which ends the test.
        self.notify_started(granted);
        Ok(lease)
    }

    /// Runs `body` with a fresh assignment and ends the test afterwards.
    ///
    /// The test is ended even if `body` panics.
    ///
    /// # Errors
    ///
    /// Returns an error if the test could not be started or if ending it
    /// failed. The body's own result is returned untouched inside `Ok`.
    pub fn run_test<F, R>(
        &self,
        test_id: impl Into<TestId>,
        requested: &[C],
        body: F,
    ) -> Result<R, RegistryError>
    where
        F: FnOnce(&Assignment<C>) -> R,
    {
        let lease = self.lease(test_id, requested)?;
        let assignment = lease.assignment()?;
        let output = body(&assignment);
        lease.end()?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::EventKind;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn registry() -> PoolRegistry<&'static str> {
        PoolRegistry::builder()
            .with_pool("organizer", [("login0", "re[g"), ("login1", ",jrd")])
            .with_pool("participant", [("login4", "vtnc")])
            .build()
            .unwrap()
    }

    #[test]
    fn dropped_lease_returns_resources() {
        let registry = registry();
        let lease = registry.lease("t1", &["organizer", "participant"]).unwrap();
        assert_eq!(registry.snapshot().checked_out(), 2);
        drop(lease);
        assert_eq!(registry.snapshot().checked_out(), 0);
        assert!(!registry.is_assigned("t1"));
    }

    #[test]
    fn explicit_end_reports_errors() {
        let registry = registry();
        let lease = registry.lease("t1", &["organizer"]).unwrap();
        registry.end_test("t1").unwrap();
        assert!(lease.end().unwrap_err().is_not_found());
    }

    #[test]
    fn stale_lease_leaves_reused_id_alone() {
        let registry = PoolRegistry::builder()
            .with_pool("organizer", [("login0", "re[g")])
            .build()
            .unwrap();

        let stale = registry.lease("t1", &["organizer"]).unwrap();
        registry.end_test("t1").unwrap();
        // Same id, and the same single account, for a new test.
        registry.begin_test("t1", &["organizer"]).unwrap();

        drop(stale);
        assert!(registry.is_assigned("t1"));
        assert_eq!(registry.snapshot().checked_out(), 1);

        registry.end_test("t1").unwrap();
        assert_eq!(registry.snapshot().checked_out(), 0);
    }

    #[test]
    fn stale_lease_end_reports_not_found() {
        let registry = registry();
        let stale = registry.lease("t1", &["organizer"]).unwrap();
        registry.end_test("t1").unwrap();
        registry.begin_test("t1", &["participant"]).unwrap();

        assert!(stale.end().unwrap_err().is_not_found());
        assert!(registry.get_assigned("t1", &"participant").is_ok());
    }

    #[test]
    fn panicking_start_observer_does_not_leak_lease() {
        let registry = registry();
        registry
            .hooks()
            .register_observer_on(&[EventKind::TestStarted], "explodes", |_| {
                panic!("observer failed");
            })
            .unwrap();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            registry.lease("t1", &["organizer", "participant"]).map(drop)
        }));
        assert!(outcome.is_err());
        assert_eq!(registry.snapshot().checked_out(), 0);
        assert!(!registry.is_assigned("t1"));

        let outcome = catch_unwind(AssertUnwindSafe(|| registry.begin_test("t2", &["organizer"])));
        assert!(outcome.is_err());
        assert_eq!(registry.snapshot().checked_out(), 0);
        assert!(!registry.is_assigned("t2"));
    }

    #[test]
    fn run_test_returns_body_output() {
        let registry = registry();
        let login = registry
            .run_test("t1", &["participant"], |assignment| {
                assignment.get(&"participant").map(|r| r.identifier().to_owned())
            })
            .unwrap();
        assert_eq!(login.as_deref(), Some("login4"));
        assert_eq!(registry.live_tests(), 0);
    }

    #[test]
    fn run_test_ends_test_on_panic() {
        let registry = registry();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            registry.run_test("t1", &["organizer"], |_| -> u32 { panic!("test body failed") })
        }));
        assert!(outcome.is_err());
        assert_eq!(registry.snapshot().checked_out(), 0);
        assert!(!registry.is_assigned("t1"));
    }
}
