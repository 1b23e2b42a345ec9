//! Category tags.

use core::fmt::Debug;
use core::hash::Hash;

/// A tag identifying which pool a resource belongs to.
///
/// Any type that is `Clone + Eq + Hash + Ord + Debug + Send + Sync + 'static`
/// automatically implements `Category`. A closed set of categories is usually
/// expressed as a fieldless enum; an open, data-driven set can use `String`.
///
/// The `Ord` bound defines the canonical acquisition order used by the
/// registry when a single test requests several categories.
///
/// # Example
///
/// ```
/// use quartermaster_pool::Category;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// enum Account {
///     Organizer,
///     Participant,
/// }
///
/// assert_eq!(Account::Participant.label(), "Participant");
/// assert_eq!(String::from("admin").label(), "\"admin\"");
/// ```
pub trait Category: Clone + Eq + Hash + Ord + Debug + Send + Sync + 'static {
    /// Returns the label used for this category in errors and log fields.
    fn label(&self) -> String {
        format!("{self:?}")
    }
}

// Blanket implementation for all compatible types
impl<T: Clone + Eq + Hash + Ord + Debug + Send + Sync + 'static> Category for T {}
