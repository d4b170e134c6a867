//! Bounded Cache with Pluggable Eviction
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         CacheStore                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  entries: key -> CacheEntry { access_count, last, inserted }  │
//! │  clock:   logical Tick, +1 per insert/touch                   │
//! │                              │                                │
//! │               full on insert │                                │
//! │                              ▼                                │
//! │                 EvictionPolicy::select_victim                 │
//! │                   LRU  │  FIFO  │  LFU                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store never decides on its own when to record a hit; the order
//! processor calls [`CacheStore::touch`] or [`CacheStore::insert`] when an
//! order completes.

mod entry;
mod policy;
mod store;

#[cfg(test)]
mod proptest;

pub use entry::{CacheEntry, Tick};
pub use policy::{EvictionPolicy, Fifo, Lfu, Lru, VictimSelector};
pub use store::{CacheStore, EvictionEvent, Lookup, MANUAL_EVICTION_REASON};

/// Default capacity, matching the coffee counter's three warming slots
pub const DEFAULT_CAPACITY: usize = 3;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity_is_valid() {
        let store = CacheStore::new(DEFAULT_CAPACITY).unwrap();
        assert_eq!(store.capacity(), 3);
    }
}
