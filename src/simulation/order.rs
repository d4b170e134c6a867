//! Order Processor
//!
//! Drives one order at a time through the counter:
//!
//! ```text
//! Idle ──receive──▶ Received ──lookup──▶ Preparing ──complete──▶ Completed ──▶ Idle
//! ```
//!
//! `Received` is transient: the lookup happens inside [`OrderProcessor::receive`]
//! and the order leaves it before the call returns. `Preparing` lasts until the
//! controller's timer calls [`OrderProcessor::complete`], which applies the
//! cache mutation and hands the finished [`Order`] back.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::StatisticsAggregator;
use crate::cache::{CacheStore, EvictionEvent, EvictionPolicy, Lookup};
use crate::domain::{OrderId, OrderOutcome};

// =============================================================================
// Order State Machine
// =============================================================================

/// Processor phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderPhase {
    /// Ready for a new order
    #[default]
    Idle,
    /// Order accepted, cache lookup in progress
    Received,
    /// Timed preparation running
    Preparing,
    /// Cache mutation applied
    Completed,
}

impl OrderPhase {
    /// Whether an order occupies the counter
    pub fn is_busy(&self) -> bool {
        matches!(self, OrderPhase::Received | OrderPhase::Preparing)
    }
}

impl std::fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPhase::Idle => write!(f, "Idle"),
            OrderPhase::Received => write!(f, "Received"),
            OrderPhase::Preparing => write!(f, "Preparing"),
            OrderPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// A step in an order's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStep {
    pub phase: OrderPhase,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// A customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Session-unique identifier
    pub id: OrderId,

    /// Requested catalog item
    pub item: String,

    /// Policy active at submission; used for eviction and statistics
    pub policy: EvictionPolicy,

    /// Lookup result, fixed at receipt
    pub outcome: OrderOutcome,

    /// Current phase
    pub phase: OrderPhase,

    /// When the order was accepted
    pub submitted_at: DateTime<Utc>,

    /// When the cache mutation was applied
    pub completed_at: Option<DateTime<Utc>>,

    /// Simulated preparation cost
    pub preparation_ms: u64,

    /// Step-by-step log
    pub steps: Vec<OrderStep>,
}

impl Order {
    fn new(id: OrderId, item: String, policy: EvictionPolicy, outcome: OrderOutcome) -> Self {
        Self {
            id,
            item,
            policy,
            outcome,
            phase: OrderPhase::Idle,
            submitted_at: Utc::now(),
            completed_at: None,
            preparation_ms: 0,
            steps: vec![],
        }
    }

    /// Check if the order was served from cache
    pub fn is_hit(&self) -> bool {
        self.outcome.is_hit()
    }

    /// Check if the order has finished
    pub fn is_completed(&self) -> bool {
        self.phase == OrderPhase::Completed
    }

    pub fn preparation_time(&self) -> Duration {
        Duration::from_millis(self.preparation_ms)
    }

    /// Record a state transition
    fn transition(&mut self, phase: OrderPhase, message: impl Into<String>) {
        self.phase = phase;
        self.steps.push(OrderStep {
            phase,
            timestamp: Utc::now(),
            message: message.into(),
        });
    }

    /// Record a step without changing phase
    fn note(&mut self, message: impl Into<String>) {
        let phase = self.phase;
        self.transition(phase, message);
    }
}

/// Result of completing an order
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The finished order
    pub order: Order,
    /// Whether the item was (re)inserted into the cache
    pub inserted: bool,
    /// Entry displaced to make room, if any
    pub eviction: Option<EvictionEvent>,
}

// =============================================================================
// Processor
// =============================================================================

/// Single-slot order processor
#[derive(Debug, Clone)]
pub struct OrderProcessor {
    hit_duration: Duration,
    miss_duration: Duration,
    current: Option<Order>,
}

impl OrderProcessor {
    /// Create a processor with the given preparation times
    pub fn new(hit_duration: Duration, miss_duration: Duration) -> Self {
        Self {
            hit_duration,
            miss_duration,
            current: None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> OrderPhase {
        self.current
            .as_ref()
            .map(|order| order.phase)
            .unwrap_or(OrderPhase::Idle)
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// The in-flight order, if any
    pub fn current(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    /// Preparation time for an outcome
    pub fn duration_for(&self, outcome: OrderOutcome) -> Duration {
        match outcome {
            OrderOutcome::Hit => self.hit_duration,
            OrderOutcome::Miss => self.miss_duration,
        }
    }

    /// Accept an order and classify it against `store`.
    ///
    /// Returns the outcome and how long preparation takes, or `None` when
    /// another order is in flight.
    pub fn receive(
        &mut self,
        id: OrderId,
        item: impl Into<String>,
        policy: EvictionPolicy,
        store: &CacheStore,
    ) -> Option<(OrderOutcome, Duration)> {
        if self.current.is_some() {
            return None;
        }

        let item = item.into();
        let outcome = match store.lookup(&item) {
            Lookup::Hit(_) => OrderOutcome::Hit,
            Lookup::Miss => OrderOutcome::Miss,
        };
        let duration = self.duration_for(outcome);

        let mut order = Order::new(id, item, policy, outcome);
        order.transition(
            OrderPhase::Received,
            format!("Received order for {}", order.item),
        );

        let classification = match outcome {
            OrderOutcome::Hit => format!("Cache HIT! {} found in cache", order.item),
            OrderOutcome::Miss => format!("Cache MISS! {} not in cache", order.item),
        };
        order.note(classification);

        let preparation = match outcome {
            OrderOutcome::Hit => "Serving cached order".to_string(),
            OrderOutcome::Miss => format!("Preparing fresh {}", order.item),
        };
        order.preparation_ms = duration.as_millis() as u64;
        order.transition(OrderPhase::Preparing, preparation);

        debug!(
            order_id = %order.id,
            item = %order.item,
            outcome = %outcome,
            duration_ms = order.preparation_ms,
            "Order preparing"
        );

        self.current = Some(order);
        Some((outcome, duration))
    }

    /// Finish the in-flight order: apply its cache mutation and record it.
    ///
    /// Returns `None` if nothing is preparing.
    pub fn complete(
        &mut self,
        store: &mut CacheStore,
        stats: &mut StatisticsAggregator,
    ) -> Option<Completion> {
        if self.phase() != OrderPhase::Preparing {
            return None;
        }
        let mut order = self.current.take()?;

        let mut inserted = false;
        let mut eviction = None;

        if order.is_hit() && store.contains(&order.item) {
            store.touch(&order.item);
        } else {
            // Hits whose entry was removed by hand mid-preparation land here too
            eviction = store.insert(order.item.clone(), order.policy);
            inserted = true;
        }

        if let Some(event) = &eviction {
            order.note(format!("Evicted {} ({})", event.victim_key, event.reason));
        }
        if inserted {
            order.note(format!("Added {} to cache", order.item));
        }

        order.completed_at = Some(Utc::now());
        order.transition(OrderPhase::Completed, format!("Order {} completed", order.id));
        stats.record(&order);

        Some(Completion {
            order,
            inserted,
            eviction,
        })
    }

    /// Drop the in-flight order without applying it
    pub fn cancel(&mut self) -> Option<Order> {
        self.current.take()
    }
}

// =============================================================================
// Tests
// =============================================================================
