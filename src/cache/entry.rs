//! Cache Entry Types
//!
//! Per-item metadata tracked by the store and consulted by eviction policies.

use serde::{Deserialize, Serialize};

/// Logical timestamp issued by a [`CacheStore`](super::CacheStore).
///
/// Ticks strictly increase with every insert and touch, so two operations
/// never share a timestamp even when they happen within the same wall-clock
/// instant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    /// The tick that follows this one
    #[inline]
    pub fn next(self) -> Self {
        Tick(self.0 + 1)
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for a cached item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Item identifier from the catalog
    key: String,
    /// Number of times the entry has been served (>= 1)
    access_count: u32,
    /// Updated on insertion and on every hit
    last_accessed_at: Tick,
    /// Set once at creation
    inserted_at: Tick,
}

impl CacheEntry {
    /// Create a freshly inserted entry
    pub fn new(key: impl Into<String>, now: Tick) -> Self {
        Self {
            key: key.into(),
            access_count: 1,
            last_accessed_at: now,
            inserted_at: now,
        }
    }

    /// Record a hit and return the new access count
    #[inline]
    pub fn record_access(&mut self, now: Tick) -> u32 {
        self.access_count += 1;
        self.last_accessed_at = now;
        self.access_count
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn access_count(&self) -> u32 {
        self.access_count
    }

    #[inline]
    pub fn last_accessed_at(&self) -> Tick {
        self.last_accessed_at
    }

    #[inline]
    pub fn inserted_at(&self) -> Tick {
        self.inserted_at
    }
}

// =============================================================================
// Tests
// =============================================================================
