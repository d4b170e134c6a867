//! Read-only view of a session, for UIs and the CLI report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::order::{Order, OrderPhase};
use super::stats::StatisticsSnapshot;
use crate::cache::{CacheEntry, EvictionEvent, EvictionPolicy, Tick};

/// Manual removal waiting for its delay to elapse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRemoval {
    /// Item to remove
    pub key: String,
    /// When the removal was requested
    pub requested_at: DateTime<Utc>,
    /// When it is due
    pub apply_at: DateTime<Utc>,
    /// Insertion tick of the entry that was targeted
    #[serde(skip)]
    pub(crate) inserted_at: Tick,
}

/// Point-in-time state of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// Policy applied to new orders
    pub policy: EvictionPolicy,
    pub capacity: usize,
    /// Cached entries, oldest first
    pub entries: Vec<CacheEntry>,
    /// Processor phase
    pub phase: OrderPhase,
    /// Order being prepared, with its step log
    pub current_order: Option<Order>,
    /// Completed orders, oldest first
    pub completed_orders: Vec<Order>,
    pub statistics: StatisticsSnapshot,
    pub pending_removals: Vec<PendingRemoval>,
    /// Most recent entry to leave the cache
    pub last_eviction: Option<EvictionEvent>,
    /// Policy-driven evictions this session
    pub eviction_count: u64,
}

impl SimulationSnapshot {
    /// Cached keys, oldest first
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key()).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == OrderPhase::Idle
    }

    /// Check if `key` is announced for removal
    pub fn is_pending_removal(&self, key: &str) -> bool {
        self.pending_removals.iter().any(|p| p.key == key)
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
