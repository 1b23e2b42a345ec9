//! Example test suite drawing accounts from a quartermaster registry.
//!
//! A handful of worker threads play the role of a test-execution engine.
//! Each simulated test declares which account categories it needs, receives
//! one account per category for its duration, and returns them when done.
//!
//! ```text
//!  worker 1 ─┐                       ┌─ ORGANIZER pool   (login0..login3)
//!  worker 2 ─┼─▶ TestLifecycle ─▶ PoolRegistry
//!  worker N ─┘                       └─ PARTICIPANT pool (login4..login7)
//! ```

use core::time::Duration;
use std::collections::VecDeque;
use std::thread;

use parking_lot::Mutex;
use quartermaster_registry::{RegistryError, TestId, TestLifecycle};
use serde::Deserialize;

/// Inventory used when no file is configured.
pub const BUNDLED_INVENTORY: &str = include_str!("../inventory.json");

/// Account categories of the application under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Account {
    /// Creates and manages events.
    Organizer,
    /// Joins events.
    Participant,
}

/// One test of the simulated suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTest {
    /// Unique test identifier.
    pub id: TestId,
    /// Categories the test needs an account for.
    pub needs: Vec<Account>,
    /// How long the test body holds its accounts.
    pub duration: Duration,
}

/// Builds a deterministic mix of `count` tests.
///
/// Every third test needs an organizer and a participant; the rest need one
/// of the two. Requests for both categories alternate their order.
#[must_use]
pub fn plan(count: usize) -> Vec<SimulatedTest> {
    (0..count)
        .map(|i| {
            let needs = match i % 6 {
                0 => vec![Account::Organizer, Account::Participant],
                3 => vec![Account::Participant, Account::Organizer],
                1 | 4 => vec![Account::Organizer],
                _ => vec![Account::Participant],
            };
            SimulatedTest {
                id: TestId::new(format!("test_{i:03}")),
                needs,
                duration: Duration::from_millis(5 + (i as u64 * 7) % 20),
            }
        })
        .collect()
}

/// Result of running a suite.
#[derive(Debug, Default)]
pub struct SuiteOutcome {
    /// Tests that started, used their accounts and ended.
    pub passed: Vec<TestId>,
    /// Tests that failed, with the error that stopped them.
    pub failed: Vec<(TestId, RegistryError)>,
}

/// Runs `tests` on `workers` threads against `engine`.
///
/// Each worker repeatedly takes the next test, starts it, looks up every
/// account it needs, holds them for the test's duration and ends the test.
/// A failure to end a test is recorded but does not stop the worker.
pub fn run_suite<L>(engine: &L, tests: Vec<SimulatedTest>, workers: usize) -> SuiteOutcome
where
    L: TestLifecycle<Account>,
{
    let queue = Mutex::new(VecDeque::from(tests));
    let outcome = Mutex::new(SuiteOutcome::default());

    thread::scope(|scope| {
        for worker in 0..workers.max(1) {
            let queue = &queue;
            let outcome = &outcome;
            scope.spawn(move || {
                while let Some(test) = queue.lock().pop_front() {
                    let _span = tracing::info_span!("test", worker, test_id = %test.id).entered();
                    match run_one(engine, &test) {
                        Ok(()) => outcome.lock().passed.push(test.id),
                        Err(error) => {
                            tracing::error!(%error, "test failed");
                            outcome.lock().failed.push((test.id, error));
                        }
                    }
                }
            });
        }
    });

    outcome.into_inner()
}

fn run_one<L: TestLifecycle<Account>>(
    engine: &L,
    test: &SimulatedTest,
) -> Result<(), RegistryError> {
    engine.on_test_start(&test.id, &test.needs)?;

    let body = test.needs.iter().try_for_each(|category| {
        let account = engine.on_parameter_needed(&test.id, category)?;
        tracing::debug!(?category, login = account.identifier(), "logged in");
        Ok(())
    });
    thread::sleep(test.duration);

    // End the test whether or not the body succeeded.
    let ended = engine.on_test_end(&test.id);
    body.and(ended)
}
