//! Statistics Aggregator
//!
//! Per-policy hit counters fed by completed orders. Buckets are independent:
//! an order counts only toward the policy it was submitted under, so
//! switching policies mid-session leaves earlier figures untouched.

use std::time::Duration;

use serde::Serialize;

use super::order::Order;
use crate::cache::EvictionPolicy;

/// Counters for one policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyStatistics {
    total_orders: u64,
    cache_hits: u64,
}

impl PolicyStatistics {
    /// Count one completed order
    pub fn record(&mut self, hit: bool) {
        self.total_orders += 1;
        if hit {
            self.cache_hits += 1;
        }
    }

    pub fn total_orders(&self) -> u64 {
        self.total_orders
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.total_orders - self.cache_hits
    }

    /// Hit rate in percent, 0 when no orders were recorded
    pub fn hit_rate(&self) -> f64 {
        if self.total_orders == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.total_orders as f64 * 100.0
    }

    /// Serialisable view including the derived rate
    pub fn snapshot(&self) -> PolicyStatisticsSnapshot {
        PolicyStatisticsSnapshot {
            total_orders: self.total_orders,
            cache_hits: self.cache_hits,
            hit_rate: self.hit_rate(),
        }
    }
}

/// Point-in-time figures for one policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyStatisticsSnapshot {
    pub total_orders: u64,
    pub cache_hits: u64,
    pub hit_rate: f64,
}

/// Point-in-time figures for every policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub lru: PolicyStatisticsSnapshot,
    pub fifo: PolicyStatisticsSnapshot,
    pub lfu: PolicyStatisticsSnapshot,
    /// Orders completed under any policy
    pub total_orders: u64,
    /// Simulated preparation time summed over completed orders
    pub total_preparation_ms: u64,
}

impl StatisticsSnapshot {
    pub fn for_policy(&self, policy: EvictionPolicy) -> &PolicyStatisticsSnapshot {
        match policy {
            EvictionPolicy::Lru => &self.lru,
            EvictionPolicy::Fifo => &self.fifo,
            EvictionPolicy::Lfu => &self.lfu,
        }
    }
}

/// Statistics for a whole session
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    lru: PolicyStatistics,
    fifo: PolicyStatistics,
    lfu: PolicyStatistics,
    total_preparation: Duration,
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account a completed order under the policy it was submitted with
    pub fn record(&mut self, order: &Order) {
        self.bucket_mut(order.policy).record(order.is_hit());
        self.total_preparation += order.preparation_time();
    }

    /// Counters for `policy`
    pub fn for_policy(&self, policy: EvictionPolicy) -> &PolicyStatistics {
        match policy {
            EvictionPolicy::Lru => &self.lru,
            EvictionPolicy::Fifo => &self.fifo,
            EvictionPolicy::Lfu => &self.lfu,
        }
    }

    fn bucket_mut(&mut self, policy: EvictionPolicy) -> &mut PolicyStatistics {
        match policy {
            EvictionPolicy::Lru => &mut self.lru,
            EvictionPolicy::Fifo => &mut self.fifo,
            EvictionPolicy::Lfu => &mut self.lfu,
        }
    }

    pub fn total_orders(&self) -> u64 {
        EvictionPolicy::ALL
            .iter()
            .map(|p| self.for_policy(*p).total_orders())
            .sum()
    }

    pub fn total_preparation(&self) -> Duration {
        self.total_preparation
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            lru: self.lru.snapshot(),
            fifo: self.fifo.snapshot(),
            lfu: self.lfu.snapshot(),
            total_orders: self.total_orders(),
            total_preparation_ms: self.total_preparation.as_millis() as u64,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
