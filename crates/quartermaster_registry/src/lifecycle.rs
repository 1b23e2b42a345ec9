//! Integration boundary with a test-execution engine.

use quartermaster_pool::{Category, Resource};

use crate::{PoolRegistry, RegistryError, TestId};

/// Lifecycle callbacks a test-execution engine drives for every test.
///
/// The engine owns test identity and decides which categories a test needs.
/// It must call the methods in this order for each test:
///
/// 1. **Start** - `on_test_start()` before the test body runs
/// 2. **Lookup** - `on_parameter_needed()` any number of times while it runs
/// 3. **End** - `on_test_end()` after the body completes, pass or fail
///
/// [`PoolRegistry`] implements this trait by delegating to
/// [`begin_test`](PoolRegistry::begin_test),
/// [`get_assigned`](PoolRegistry::get_assigned) and
/// [`end_test`](PoolRegistry::end_test). Engines that cannot guarantee the
/// end callback on every exit path should prefer
/// [`PoolRegistry::lease`] instead.
pub trait TestLifecycle<C: Category>: Send + Sync {
    /// Called before the test body runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the test's resources could not be assigned.
    fn on_test_start(&self, test_id: &TestId, requested: &[C]) -> Result<(), RegistryError>;

    /// Called whenever the test body needs the resource for `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the test holds nothing for `category`.
    fn on_parameter_needed(
        &self,
        test_id: &TestId,
        category: &C,
    ) -> Result<Resource<C>, RegistryError>;

    /// Called after the test body completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the test was not started or a release failed.
    fn on_test_end(&self, test_id: &TestId) -> Result<(), RegistryError>;
}

impl<C: Category> TestLifecycle<C> for PoolRegistry<C> {
    fn on_test_start(&self, test_id: &TestId, requested: &[C]) -> Result<(), RegistryError> {
        self.begin_test(test_id, requested)
    }

    fn on_parameter_needed(
        &self,
        test_id: &TestId,
        category: &C,
    ) -> Result<Resource<C>, RegistryError> {
        self.get_assigned(test_id, category)
    }

    fn on_test_end(&self, test_id: &TestId) -> Result<(), RegistryError> {
        self.end_test(test_id)
    }
}
