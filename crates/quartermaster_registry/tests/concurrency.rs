//! Concurrent lifecycle tests for `quartermaster_registry`.
//!
//! Many more tests than resources run begin → read → end against shared
//! pools. Every lifecycle must complete and no resource may be held by two
//! live tests at once.

use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use hashbrown::HashSet;
use quartermaster_registry::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Account {
    Organizer,
    Participant,
}

fn registry_of(organizers: usize, participants: usize) -> PoolRegistry<Account> {
    PoolRegistry::builder()
        .with_pool(
            Account::Organizer,
            (0..organizers).map(|i| (format!("login{i}"), "secret")),
        )
        .with_pool(
            Account::Participant,
            (0..participants).map(|i| (format!("login{}", organizers + i), "secret")),
        )
        .build()
        .expect("valid inventory")
}

/// N lifecycles against K < N resources all complete.
#[test]
fn all_lifecycles_complete_under_contention() {
    let registry = Arc::new(registry_of(2, 2));
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..12)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let completed = Arc::clone(&completed);
            thread::spawn(move || {
                for round in 0..20 {
                    let id = format!("w{worker}-r{round}");
                    registry.begin_test(id.as_str(), &[Account::Organizer]).unwrap();
                    let resource = registry.get_assigned(&id, &Account::Organizer).unwrap();
                    assert_eq!(resource.category(), &Account::Organizer);
                    registry.end_test(&id).unwrap();
                }
                completed.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(completed.load(Ordering::SeqCst), 12);
    let snapshot = registry.snapshot();
    assert_eq!(snapshot.checked_out(), 0);
    assert_eq!(snapshot.live_tests(), 0);
}

/// Tests requesting both categories in opposite orders never deadlock.
#[test]
fn opposite_request_orders_do_not_deadlock() {
    let registry = Arc::new(registry_of(1, 1));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let request = if worker % 2 == 0 {
                [Account::Organizer, Account::Participant]
            } else {
                [Account::Participant, Account::Organizer]
            };
            thread::spawn(move || {
                barrier.wait();
                for round in 0..25 {
                    let id = format!("w{worker}-r{round}");
                    registry.begin_test(id.as_str(), &request).unwrap();
                    thread::yield_now();
                    registry.end_test(&id).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(registry.snapshot().is_closed_world());
    assert_eq!(registry.snapshot().checked_out(), 0);
}

/// No resource is visible in two live assignments at the same time.
#[test]
fn no_resource_is_assigned_twice() {
    let registry = Arc::new(registry_of(3, 2));
    let held: Arc<Mutex<HashSet<ResourceId>>> = Arc::new(Mutex::new(HashSet::new()));

    thread::scope(|scope| {
        for worker in 0..10 {
            let registry = &registry;
            let held = &held;
            scope.spawn(move || {
                for round in 0..30 {
                    let id = format!("w{worker}-r{round}");
                    registry
                        .begin_test(id.as_str(), &[Account::Participant, Account::Organizer])
                        .unwrap();

                    let assignment = registry.assignment(&id).unwrap();
                    for resource_id in assignment.resource_ids() {
                        assert!(
                            held.lock().unwrap().insert(resource_id),
                            "resource {resource_id} assigned twice"
                        );
                    }
                    thread::yield_now();
                    for resource_id in assignment.resource_ids() {
                        held.lock().unwrap().remove(&resource_id);
                    }

                    registry.end_test(&id).unwrap();
                }
            });
        }
    });

    assert!(held.lock().unwrap().is_empty());
    assert_eq!(registry.snapshot().checked_out(), 0);
}

/// With a bound, waiters fail fast while the pool is held and leave nothing behind.
#[test]
fn bounded_waits_fail_without_leaking() {
    let registry = Arc::new(
        PoolRegistry::builder()
            .with_pool(Account::Organizer, [("login0", "re[g")])
            .with_pool(Account::Participant, [("login4", "vtnc"), ("login5", "rjrc")])
            .with_acquire_timeout(Duration::from_millis(30))
            .build()
            .unwrap(),
    );
    registry.begin_test("holder", &[Account::Organizer]).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry.begin_test(
                    format!("waiter{worker}"),
                    &[Account::Participant, Account::Organizer],
                )
            })
        })
        .collect();

    for handle in handles {
        let err = handle.join().expect("Thread panicked").unwrap_err();
        assert!(err.is_exhausted());
    }

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.get(&Account::Participant).unwrap().available, 2);
    assert_eq!(snapshot.live_tests(), 1);
}

/// Dropped leases return their resources even when the body panics.
#[test]
fn panicking_workers_do_not_leak() {
    let registry = Arc::new(registry_of(2, 2));

    let handles: Vec<_> = (0..6)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let lease = registry
                    .lease(format!("w{worker}"), &[Account::Organizer])
                    .unwrap();
                assert!(lease.get(&Account::Organizer).is_ok());
                if worker % 2 == 0 {
                    panic!("worker {worker} aborted");
                }
            })
        })
        .collect();

    let panicked = handles
        .into_iter()
        .map(thread::JoinHandle::join)
        .filter(Result::is_err)
        .count();

    assert_eq!(panicked, 3);
    assert_eq!(registry.snapshot().checked_out(), 0);
    assert_eq!(registry.live_tests(), 0);
}
