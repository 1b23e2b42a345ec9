//! Concurrent access tests for `quartermaster_pool`.
//!
//! These tests verify that a single pool never double-issues a resource and
//! never loses one while many threads acquire and release simultaneously.

use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use hashbrown::HashSet;
use quartermaster_pool::{PoolError, Resource, ResourceId, ResourcePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Kind {
    Organizer,
}

fn pool_of(n: usize) -> Arc<ResourcePool<Kind>> {
    Arc::new(
        ResourcePool::new(
            Kind::Organizer,
            (0..n).map(|i| Resource::new(Kind::Organizer, format!("login{i}"), "secret")),
        )
        .expect("valid seed"),
    )
}

/// Many more threads than resources: every thread eventually gets one.
#[test]
fn contended_acquire_release_completes() {
    let pool = pool_of(2);
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let completed = Arc::clone(&completed);
            thread::spawn(move || {
                for _ in 0..50 {
                    let resource = pool.acquire_blocking().unwrap();
                    assert_eq!(resource.category(), &Kind::Organizer);
                    pool.release(resource).unwrap();
                }
                completed.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(completed.load(Ordering::SeqCst), 16);
    assert_eq!(pool.available(), 2);
    assert_eq!(pool.checked_out(), 0);
}

/// No resource is ever held by two threads at the same time.
#[test]
fn no_double_issue_under_contention() {
    let pool = pool_of(3);
    let held: Arc<Mutex<HashSet<ResourceId>>> = Arc::new(Mutex::new(HashSet::new()));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let held = Arc::clone(&held);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    let resource = pool.acquire_blocking().unwrap();
                    assert!(
                        held.lock().unwrap().insert(resource.id()),
                        "resource {} issued twice",
                        resource.id()
                    );
                    thread::yield_now();
                    held.lock().unwrap().remove(&resource.id());
                    pool.release(resource).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(pool.available(), 3);
}

/// The inventory is the same set of resources after a stress run.
#[test]
fn inventory_is_restored_after_stress() {
    let pool = pool_of(4);
    let before: HashSet<ResourceId> = pool.idle_ids().into_iter().collect();

    thread::scope(|scope| {
        for _ in 0..6 {
            let pool = &pool;
            scope.spawn(move || {
                for _ in 0..25 {
                    let a = pool.acquire_blocking().unwrap();
                    let b = pool.acquire_timeout(Duration::from_millis(10));
                    pool.release(a).unwrap();
                    if let Ok(b) = b {
                        pool.release(b).unwrap();
                    }
                }
            });
        }
    });

    let after: HashSet<ResourceId> = pool.idle_ids().into_iter().collect();
    assert_eq!(before, after);
}

/// Bounded waiters either get a resource or report exhaustion, never hang.
#[test]
fn bounded_waiters_time_out_while_resource_is_held() {
    let pool = pool_of(1);
    let held = pool.acquire_blocking().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.acquire_timeout(Duration::from_millis(30)))
        })
        .collect();

    for handle in handles {
        let result = handle.join().expect("Thread panicked");
        assert!(matches!(result, Err(PoolError::Exhausted { .. })));
    }

    pool.release(held).unwrap();
    assert_eq!(pool.available(), 1);
}
