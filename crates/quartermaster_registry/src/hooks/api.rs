//! Hook registration API for registry events.
//!
//! [`RegistryHooks`] stores named observers and invokes them with every
//! [`PoolEvent`] they subscribed to, in registration order.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::RwLock;
use quartermaster_pool::Category;

use super::events::{EventKind, PoolEvent};

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookRegistrationError {
    /// A hook with this name is already registered.
    #[error("hook '{name}' is already registered")]
    DuplicateName {
        /// The duplicate hook name.
        name: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HookEntry
// ─────────────────────────────────────────────────────────────────────────────

type Observer<C> = Arc<dyn Fn(&PoolEvent<C>) + Send + Sync>;

/// Entry in the hook registry, containing metadata and the hook function.
struct HookEntry<C: Category> {
    /// Human-readable name for debugging and logging.
    name: String,
    /// Events this hook subscribed to.
    kinds: HashSet<EventKind>,
    /// The hook function.
    observer: Observer<C>,
}

// ─────────────────────────────────────────────────────────────────────────────
// RegistryHooks
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of observers notified about test lifecycle events.
///
/// # Thread Safety
///
/// Uses interior mutability via [`RwLock`], so observers can be registered
/// on a shared registry while tests are running. Observers run on the thread
/// that triggered the event, after the registry has released its own locks,
/// so an observer may call back into the registry.
///
/// # Example
///
/// ```
/// use quartermaster_registry::hooks::{EventKind, PoolEvent, RegistryHooks};
///
/// let hooks = RegistryHooks::<&'static str>::new();
///
/// hooks
///     .register_observer("logger", |event: &PoolEvent<&'static str>| {
///         println!("{:?}", event.kind());
///     })
///     .unwrap()
///     .register_observer_on(&[EventKind::Shutdown], "shutdown", |_| {})
///     .unwrap();
///
/// assert_eq!(hooks.hook_count(), 2);
/// assert!(hooks.register_observer("logger", |_| {}).is_err());
/// ```
pub struct RegistryHooks<C: Category> {
    hooks: RwLock<Vec<HookEntry<C>>>,
}

impl<C: Category> Default for RegistryHooks<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> fmt::Debug for RegistryHooks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read();
        f.debug_struct("RegistryHooks")
            .field(
                "hooks",
                &hooks.iter().map(|entry| entry.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<C: Category> RegistryHooks<C> {
    /// Creates an empty hooks registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Registers an observer for every event kind.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if `name` is taken.
    pub fn register_observer<F>(
        &self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        F: Fn(&PoolEvent<C>) + Send + Sync + 'static,
    {
        self.register_observer_on(&EventKind::ALL, name, hook)
    }

    /// Registers an observer for the given event kinds only.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateName`] if `name` is taken.
    pub fn register_observer_on<F>(
        &self,
        kinds: &[EventKind],
        name: impl Into<String>,
        hook: F,
    ) -> Result<&Self, HookRegistrationError>
    where
        F: Fn(&PoolEvent<C>) + Send + Sync + 'static,
    {
        let name = name.into();
        let mut hooks = self.hooks.write();

        if hooks.iter().any(|entry| entry.name == name) {
            return Err(HookRegistrationError::DuplicateName { name });
        }

        hooks.push(HookEntry {
            name,
            kinds: kinds.iter().copied().collect(),
            observer: Arc::new(hook),
        });
        Ok(self)
    }

    /// Invokes every observer subscribed to the event's kind, in registration order.
    pub fn invoke(&self, event: &PoolEvent<C>) {
        let kind = event.kind();
        // Snapshot the observers so none of them runs under the lock.
        let observers: Vec<Observer<C>> = self
            .hooks
            .read()
            .iter()
            .filter(|entry| entry.kinds.contains(&kind))
            .map(|entry| Arc::clone(&entry.observer))
            .collect();

        for observer in observers {
            observer(event);
        }
    }

    /// Returns the number of registered hooks.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }

    /// Checks if a hook with the given name exists.
    #[must_use]
    pub fn contains_hook(&self, name: &str) -> bool {
        self.hooks.read().iter().any(|entry| entry.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestId;
    use core::time::Duration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn started() -> PoolEvent<&'static str> {
        PoolEvent::TestStarted {
            test_id: TestId::from("t1"),
            resources: Vec::new(),
            waited: Duration::ZERO,
        }
    }

    #[test]
    fn register_increments_count() {
        let hooks = RegistryHooks::<&'static str>::new();
        hooks.register_observer("first", |_| {}).unwrap();
        assert_eq!(hooks.hook_count(), 1);
        hooks.register_observer("second", |_| {}).unwrap();
        assert_eq!(hooks.hook_count(), 2);
    }

    #[test]
    fn invoke_calls_hooks_in_order() {
        let hooks = RegistryHooks::<&'static str>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            hooks
                .register_observer(name, move |_| order.lock().unwrap().push(name))
                .unwrap();
        }

        hooks.invoke(&started());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn filtered_observer_skips_other_kinds() {
        let hooks = RegistryHooks::<&'static str>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        hooks
            .register_observer_on(&[EventKind::Shutdown], "shutdown_only", move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        hooks.invoke(&started());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        hooks.invoke(&PoolEvent::Shutdown { leaked: Vec::new() });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let hooks = RegistryHooks::<&'static str>::new();
        hooks.register_observer("my_hook", |_| {}).unwrap();

        let result = hooks.register_observer_on(&[EventKind::TestEnded], "my_hook", |_| {});
        assert_eq!(
            result.err(),
            Some(HookRegistrationError::DuplicateName {
                name: "my_hook".into()
            })
        );
    }

    #[test]
    fn contains_hook() {
        let hooks = RegistryHooks::<&'static str>::new();
        assert!(!hooks.contains_hook("my_hook"));
        hooks.register_observer("my_hook", |_| {}).unwrap();
        assert!(hooks.contains_hook("my_hook"));
        assert!(!hooks.contains_hook("other_hook"));
    }

    #[test]
    fn invoke_without_hooks_is_noop() {
        RegistryHooks::<&'static str>::new().invoke(&started());
    }
}
