//! Property tests for `ResourcePool`.
//!
//! A random sequence of acquire/release operations is replayed against a pool
//! and a simple model (the list of resources the test currently holds). After
//! every step the pool must satisfy inventory closure against that model.

use proptest::prelude::*;
use quartermaster_pool::{Resource, ResourcePool};

#[derive(Debug, Clone, Copy)]
enum Op {
    Acquire,
    /// Release the held resource at this index (modulo the held count).
    Release(usize),
    /// Release a resource that was already released.
    DoubleRelease,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Acquire),
        3 => any::<usize>().prop_map(Op::Release),
        1 => Just(Op::DoubleRelease),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_inventory_closure(capacity in 1..6usize, ops in prop::collection::vec(arb_op(), 0..64)) {
        let pool = ResourcePool::new(
            "organizer",
            (0..capacity).map(|i| Resource::new("organizer", format!("login{i}"), "secret")),
        )
        .expect("valid seed");
        let initial = pool.idle_ids();

        let mut held: Vec<Resource<&'static str>> = Vec::new();
        let mut last_released: Option<Resource<&'static str>> = None;

        for op in ops {
            match op {
                Op::Acquire => {
                    if let Some(resource) = pool.try_acquire() {
                        prop_assert!(held.iter().all(|h| h.id() != resource.id()));
                        prop_assert_eq!(resource.category(), &"organizer");
                        held.push(resource);
                    } else {
                        prop_assert_eq!(held.len(), capacity);
                    }
                }
                Op::Release(index) => {
                    if !held.is_empty() {
                        let resource = held.swap_remove(index % held.len());
                        pool.release(resource.clone()).expect("held resource releases");
                        last_released = Some(resource);
                    }
                }
                Op::DoubleRelease => {
                    if let Some(resource) = &last_released {
                        if held.iter().all(|h| h.id() != resource.id()) {
                            prop_assert!(pool.release(resource.clone()).is_err());
                        }
                    }
                }
            }

            prop_assert_eq!(pool.available() + held.len(), capacity);
            prop_assert_eq!(pool.checked_out(), held.len());
        }

        for resource in held.drain(..) {
            pool.release(resource).expect("held resource releases");
        }

        let mut before = initial;
        let mut after = pool.idle_ids();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
