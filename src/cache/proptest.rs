//! Property-Based Tests for the Cache Store
//!
//! Drives the store with arbitrary operation sequences and checks it against
//! a brute-force reference of the eviction criteria.
//!
//! # Test Properties
//!
//! 1. **Capacity**: `len <= capacity` after every operation
//! 2. **Uniqueness**: each key is present at most once
//! 3. **Victim correctness**: a full insert evicts the global minimum of the
//!    policy's criterion, ties resolved by smallest key

#![cfg(test)]

use std::collections::HashSet;

use proptest::prelude::*;

use super::entry::CacheEntry;
use super::policy::EvictionPolicy;
use super::store::CacheStore;

// =============================================================================
// Property Strategies
// =============================================================================

const KEYS: [&str; 6] = [
    "Americano",
    "Cappuccino",
    "Espresso",
    "Latte",
    "Macchiato",
    "Mocha",
];

#[derive(Debug, Clone)]
enum Op {
    /// Serve a key: touch if cached, insert otherwise (what an order does)
    Serve(usize),
    /// Manual removal
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..KEYS.len()).prop_map(Op::Serve),
        1 => (0..KEYS.len()).prop_map(Op::Remove),
    ]
}

fn policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop_oneof![
        Just(EvictionPolicy::Lru),
        Just(EvictionPolicy::Fifo),
        Just(EvictionPolicy::Lfu),
    ]
}

/// Reference victim: scan all entries for the policy's minimum
fn expected_victim(policy: EvictionPolicy, entries: &[CacheEntry]) -> String {
    let mut sorted: Vec<&CacheEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.key().cmp(b.key()));

    let mut best = sorted[0];
    for entry in &sorted[1..] {
        let better = match policy {
            EvictionPolicy::Lru => entry.last_accessed_at() < best.last_accessed_at(),
            EvictionPolicy::Fifo => entry.inserted_at() < best.inserted_at(),
            EvictionPolicy::Lfu => entry.access_count() < best.access_count(),
        };
        if better {
            best = entry;
        }
    }
    best.key().to_string()
}

// =============================================================================
// Store Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: capacity and key uniqueness hold after every operation.
    #[test]
    fn prop_capacity_and_uniqueness(
        capacity in 1usize..=4,
        policy in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut store = CacheStore::new(capacity).unwrap();

        for op in ops {
            match op {
                Op::Serve(i) => {
                    if store.contains(KEYS[i]) {
                        store.touch(KEYS[i]);
                    } else {
                        store.insert(KEYS[i], policy);
                    }
                }
                Op::Remove(i) => {
                    store.remove(KEYS[i]);
                }
            }

            prop_assert!(store.len() <= capacity);
            let entries = store.entries();
            let unique: HashSet<&str> = entries.iter().map(|e| e.key()).collect();
            prop_assert_eq!(unique.len(), entries.len());
        }
    }

    /// Property: every eviction removes the reference victim.
    #[test]
    fn prop_victim_matches_reference(
        capacity in 1usize..=4,
        policy in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut store = CacheStore::new(capacity).unwrap();

        for op in ops {
            match op {
                Op::Serve(i) if store.contains(KEYS[i]) => {
                    let before = store.get(KEYS[i]).unwrap().access_count();
                    prop_assert_eq!(store.touch(KEYS[i]), before + 1);
                }
                Op::Serve(i) => {
                    let before = store.to_vec();
                    let was_full = store.is_full();

                    let event = store.insert(KEYS[i], policy);

                    prop_assert_eq!(event.is_some(), was_full);
                    if let Some(event) = event {
                        prop_assert_eq!(&event.victim_key, &expected_victim(policy, &before));
                        prop_assert!(!store.contains(&event.victim_key));
                        prop_assert_eq!(event.policy, Some(policy));
                    }
                    prop_assert_eq!(store.get(KEYS[i]).unwrap().access_count(), 1);
                }
                Op::Remove(i) => {
                    store.remove(KEYS[i]);
                }
            }
        }
    }
}
