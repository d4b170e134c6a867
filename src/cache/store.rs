//! Cache Store - Bounded Item Cache
//!
//! Fixed-capacity mapping from catalog item to [`CacheEntry`]. Capacity is
//! counted in entries, not bytes; inserting into a full store evicts exactly
//! one victim chosen by the caller's [`EvictionPolicy`].
//!
//! # Invariants
//!
//! - `len() <= capacity()` before and after every operation
//! - a key is present at most once
//!
//! `touch` and `insert` have preconditions (key present / key absent). They
//! are only called by the order processor, so a violation is a logic error
//! and panics instead of returning an error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entry::{CacheEntry, Tick};
use super::policy::EvictionPolicy;
use crate::error::{Error, Result};

/// Reason recorded for removals requested by a user
pub const MANUAL_EVICTION_REASON: &str = "manual";

/// Record of an entry leaving the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvictionEvent {
    /// Key that was removed
    pub victim_key: String,
    /// Policy-specific explanation, or `manual`
    pub reason: String,
    /// Policy that chose the victim (`None` for manual removal)
    pub policy: Option<EvictionPolicy>,
    /// When the removal was decided
    pub timestamp: DateTime<Utc>,
}

impl EvictionEvent {
    /// Event for a policy-driven eviction
    pub fn policy_driven(policy: EvictionPolicy, victim: &CacheEntry) -> Self {
        Self {
            victim_key: victim.key().to_string(),
            reason: policy.eviction_reason(victim),
            policy: Some(policy),
            timestamp: Utc::now(),
        }
    }

    /// Event for a manual removal
    pub fn manual(key: impl Into<String>) -> Self {
        Self {
            victim_key: key.into(),
            reason: MANUAL_EVICTION_REASON.to_string(),
            policy: None,
            timestamp: Utc::now(),
        }
    }

    /// Whether the removal was requested by a user
    pub fn is_manual(&self) -> bool {
        self.policy.is_none()
    }
}

/// Result of a side-effect free lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The key is cached
    Hit(&'a CacheEntry),
    /// The key is not cached
    Miss,
}

impl Lookup<'_> {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

/// Bounded key -> entry store
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Maximum number of entries
    capacity: usize,
    /// Cached entries
    entries: HashMap<String, CacheEntry>,
    /// Last issued logical timestamp
    clock: Tick,
    /// Policy-driven evictions since construction or the last clear
    evictions: u64,
}

impl CacheStore {
    /// Create an empty store holding at most `capacity` entries
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::config("cache capacity must be positive"));
        }

        Ok(Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            clock: Tick::default(),
            evictions: 0,
        })
    }

    /// Look up a key without touching its metadata
    pub fn lookup(&self, key: &str) -> Lookup<'_> {
        match self.entries.get(key) {
            Some(entry) => Lookup::Hit(entry),
            None => Lookup::Miss,
        }
    }

    /// Record a hit on `key`
    ///
    /// # Panics
    ///
    /// Panics if `key` is not cached.
    pub fn touch(&mut self, key: &str) -> u32 {
        let now = self.tick();
        let entry = self
            .entries
            .get_mut(key)
            .unwrap_or_else(|| panic!("touch on uncached key '{}'", key));

        let count = entry.record_access(now);
        debug!(key, access_count = count, tick = now.0, "Cache entry touched");
        count
    }

    /// Insert `key`, evicting one victim chosen by `policy` if the store is full
    ///
    /// # Panics
    ///
    /// Panics if `key` is already cached.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        policy: EvictionPolicy,
    ) -> Option<EvictionEvent> {
        let key = key.into();
        assert!(
            !self.entries.contains_key(&key),
            "insert of already cached key '{}'",
            key
        );

        let eviction = if self.is_full() {
            Some(self.evict(policy))
        } else {
            None
        };

        let now = self.tick();
        debug!(key = %key, tick = now.0, "Cache entry inserted");
        self.entries.insert(key.clone(), CacheEntry::new(key, now));

        debug_assert!(self.entries.len() <= self.capacity);
        eviction
    }

    /// Remove `key` if present
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            debug!(key, "Cache entry removed");
        }
        removed
    }

    /// Evict the policy's victim. Only called when full.
    fn evict(&mut self, policy: EvictionPolicy) -> EvictionEvent {
        let event = {
            let candidates: Vec<&CacheEntry> = self.entries.values().collect();
            let victim_key = policy.select_victim(&candidates);
            let victim = &self.entries[victim_key];
            EvictionEvent::policy_driven(policy, victim)
        };

        self.entries.remove(&event.victim_key);
        self.evictions += 1;
        debug!(
            victim = %event.victim_key,
            policy = %policy,
            reason = %event.reason,
            "Cache entry evicted"
        );
        event
    }

    fn tick(&mut self) -> Tick {
        self.clock = self.clock.next();
        self.clock
    }

    /// Get an entry by key
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Check if the store contains a key
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries ordered by insertion time (oldest first)
    pub fn entries(&self) -> Vec<&CacheEntry> {
        let mut entries: Vec<&CacheEntry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.inserted_at());
        entries
    }

    /// Owned copy of [`entries`](Self::entries)
    pub fn to_vec(&self) -> Vec<CacheEntry> {
        self.entries().into_iter().cloned().collect()
    }

    /// Remove every entry and restart the clock
    pub fn clear(&mut self) {
        self.entries.clear();
        self.clock = Tick::default();
        self.evictions = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of policy-driven evictions
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.evictions
    }
}

// =============================================================================
// Tests
// =============================================================================
