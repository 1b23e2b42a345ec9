//! Per-test resource assignments.

use indexmap::IndexMap;
use quartermaster_pool::{Category, Resource, ResourceId};

use crate::TestId;

/// The resources granted to one in-flight test, keyed by requested category.
///
/// Categories iterate in the order the test requested them, which is not
/// necessarily the order they were acquired in.
#[derive(Debug, Clone)]
pub struct Assignment<C: Category> {
    test_id: TestId,
    resources: IndexMap<C, Resource<C>>,
}

impl<C: Category> Assignment<C> {
    pub(crate) fn new(test_id: TestId, resources: IndexMap<C, Resource<C>>) -> Self {
        Self { test_id, resources }
    }

    /// Returns the test this assignment belongs to.
    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    /// Returns the resource granted for `category`, if it was requested.
    #[must_use]
    pub fn get(&self, category: &C) -> Option<&Resource<C>> {
        self.resources.get(category)
    }

    /// Returns the requested categories in request order.
    pub fn categories(&self) -> impl Iterator<Item = &C> {
        self.resources.keys()
    }

    /// Returns `(category, resource)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&C, &Resource<C>)> {
        self.resources.iter()
    }

    /// Returns the ids of all granted resources in request order.
    #[must_use]
    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resources.values().map(Resource::id).collect()
    }

    /// Returns the number of granted resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if the test requested no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub(crate) fn into_resources(self) -> IndexMap<C, Resource<C>> {
        self.resources
    }
}
