//! Cache Eviction Policies
//!
//! Victim selection for a full cache. Each policy is a pure function over the
//! current entries; the store decides when to ask and performs the removal.
//!
//! | Policy | Victim                         |
//! |--------|--------------------------------|
//! | LRU    | minimum `last_accessed_at`     |
//! | FIFO   | minimum `inserted_at`          |
//! | LFU    | minimum `access_count`         |
//!
//! Ties are broken by the lexicographically smallest key so that victim
//! selection never depends on map iteration order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entry::CacheEntry;
use crate::error::Error;

/// Capability of choosing which entry leaves a full cache.
pub trait VictimSelector: Send + Sync {
    /// Pick the victim key among `entries`.
    ///
    /// # Panics
    ///
    /// Panics if `entries` is empty. The store only asks at capacity, so an
    /// empty candidate set means its bookkeeping is broken.
    fn select_victim<'a>(&self, entries: &[&'a CacheEntry]) -> &'a str;
}

/// Least Recently Used
#[derive(Debug, Clone, Copy, Default)]
pub struct Lru;

/// First In, First Out
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

/// Least Frequently Used
#[derive(Debug, Clone, Copy, Default)]
pub struct Lfu;

fn min_by<'a, K: Ord>(
    entries: &[&'a CacheEntry],
    criterion: impl Fn(&CacheEntry) -> K,
) -> &'a str {
    entries
        .iter()
        .copied()
        .min_by(|a, b| {
            criterion(*a)
                .cmp(&criterion(*b))
                .then_with(|| a.key().cmp(b.key()))
        })
        .map(|entry| entry.key())
        .expect("victim selection requires at least one cache entry")
}

impl VictimSelector for Lru {
    fn select_victim<'a>(&self, entries: &[&'a CacheEntry]) -> &'a str {
        min_by(entries, CacheEntry::last_accessed_at)
    }
}

impl VictimSelector for Fifo {
    fn select_victim<'a>(&self, entries: &[&'a CacheEntry]) -> &'a str {
        min_by(entries, CacheEntry::inserted_at)
    }
}

impl VictimSelector for Lfu {
    fn select_victim<'a>(&self, entries: &[&'a CacheEntry]) -> &'a str {
        min_by(entries, CacheEntry::access_count)
    }
}

/// Eviction policy selectable for a simulation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvictionPolicy {
    /// Evicts the entry that was served longest ago
    #[default]
    #[serde(alias = "lru")]
    Lru,
    /// Evicts the entry that was inserted first
    #[serde(alias = "fifo")]
    Fifo,
    /// Evicts the entry served the fewest times
    #[serde(alias = "lfu")]
    Lfu,
}

impl EvictionPolicy {
    /// Every policy, in display order
    pub const ALL: [EvictionPolicy; 3] = [
        EvictionPolicy::Lru,
        EvictionPolicy::Fifo,
        EvictionPolicy::Lfu,
    ];

    /// The selector implementing this policy
    pub fn selector(&self) -> &'static dyn VictimSelector {
        match self {
            EvictionPolicy::Lru => &Lru,
            EvictionPolicy::Fifo => &Fifo,
            EvictionPolicy::Lfu => &Lfu,
        }
    }

    /// Pick the victim key among `entries`
    pub fn select_victim<'a>(&self, entries: &[&'a CacheEntry]) -> &'a str {
        self.selector().select_victim(entries)
    }

    /// Human-readable explanation of why `victim` was chosen
    pub fn eviction_reason(&self, victim: &CacheEntry) -> String {
        match self {
            EvictionPolicy::Lru => format!(
                "Least recently used (last used at tick {})",
                victim.last_accessed_at()
            ),
            EvictionPolicy::Fifo => format!(
                "First in, first out (inserted at tick {})",
                victim.inserted_at()
            ),
            EvictionPolicy::Lfu => format!(
                "Least frequently used (used {} times)",
                victim.access_count()
            ),
        }
    }

    /// Long label, e.g. `Least Recently Used (LRU)`
    pub fn label(&self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "Least Recently Used (LRU)",
            EvictionPolicy::Fifo => "First In First Out (FIFO)",
            EvictionPolicy::Lfu => "Least Frequently Used (LFU)",
        }
    }
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Lru => write!(f, "LRU"),
            EvictionPolicy::Fifo => write!(f, "FIFO"),
            EvictionPolicy::Lfu => write!(f, "LFU"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "fifo" => Ok(EvictionPolicy::Fifo),
            "lfu" => Ok(EvictionPolicy::Lfu),
            other => Err(Error::config(format!(
                "unknown eviction policy '{}' (expected LRU, FIFO or LFU)",
                other
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
