//! Domain Events
//!
//! Immutable records of things that happened during a simulation session.
//! The controller publishes them through an [`EventSink`](super::EventSink);
//! they are never read back to drive behaviour.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ports::{OrderId, OrderOutcome};
use crate::cache::{EvictionEvent, EvictionPolicy};

/// Event representing a significant occurrence in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimulationEvent {
    // =========================================================================
    // Order Events
    // =========================================================================
    /// An order was accepted and classified.
    OrderReceived {
        order_id: OrderId,
        item: String,
        policy: EvictionPolicy,
        outcome: OrderOutcome,
        timestamp: DateTime<Utc>,
    },

    /// An order finished preparing and its cache mutation was applied.
    OrderCompleted {
        order_id: OrderId,
        item: String,
        policy: EvictionPolicy,
        outcome: OrderOutcome,
        preparation_ms: u64,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // Cache Events
    // =========================================================================
    /// A new item was stored.
    EntryInserted {
        item: String,
        timestamp: DateTime<Utc>,
    },

    /// An item left the cache, by policy or by hand.
    EntryEvicted(EvictionEvent),

    /// A manual removal was announced and will apply after a delay.
    RemovalScheduled {
        item: String,
        delay_ms: u64,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // Session Events
    // =========================================================================
    /// The active policy changed.
    PolicyChanged {
        from: EvictionPolicy,
        to: EvictionPolicy,
        timestamp: DateTime<Utc>,
    },

    /// The session was reset.
    SimulationReset {
        epoch: u64,
        timestamp: DateTime<Utc>,
    },
}

impl SimulationEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SimulationEvent::OrderReceived { timestamp, .. } => *timestamp,
            SimulationEvent::OrderCompleted { timestamp, .. } => *timestamp,
            SimulationEvent::EntryInserted { timestamp, .. } => *timestamp,
            SimulationEvent::EntryEvicted(event) => event.timestamp,
            SimulationEvent::RemovalScheduled { timestamp, .. } => *timestamp,
            SimulationEvent::PolicyChanged { timestamp, .. } => *timestamp,
            SimulationEvent::SimulationReset { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SimulationEvent::OrderReceived { .. } => "OrderReceived",
            SimulationEvent::OrderCompleted { .. } => "OrderCompleted",
            SimulationEvent::EntryInserted { .. } => "EntryInserted",
            SimulationEvent::EntryEvicted(_) => "EntryEvicted",
            SimulationEvent::RemovalScheduled { .. } => "RemovalScheduled",
            SimulationEvent::PolicyChanged { .. } => "PolicyChanged",
            SimulationEvent::SimulationReset { .. } => "SimulationReset",
        }
    }

    /// Get the catalog item if applicable.
    pub fn item(&self) -> Option<&str> {
        match self {
            SimulationEvent::OrderReceived { item, .. } => Some(item),
            SimulationEvent::OrderCompleted { item, .. } => Some(item),
            SimulationEvent::EntryInserted { item, .. } => Some(item),
            SimulationEvent::EntryEvicted(event) => Some(&event.victim_key),
            SimulationEvent::RemovalScheduled { item, .. } => Some(item),
            _ => None,
        }
    }
}

// =============================================================================
// Event Builders
// =============================================================================

impl SimulationEvent {
    /// Create an OrderReceived event.
    pub fn order_received(
        order_id: OrderId,
        item: impl Into<String>,
        policy: EvictionPolicy,
        outcome: OrderOutcome,
    ) -> Self {
        SimulationEvent::OrderReceived {
            order_id,
            item: item.into(),
            policy,
            outcome,
            timestamp: Utc::now(),
        }
    }

    /// Create an OrderCompleted event.
    pub fn order_completed(
        order_id: OrderId,
        item: impl Into<String>,
        policy: EvictionPolicy,
        outcome: OrderOutcome,
        preparation: Duration,
    ) -> Self {
        SimulationEvent::OrderCompleted {
            order_id,
            item: item.into(),
            policy,
            outcome,
            preparation_ms: preparation.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }

    /// Create an EntryInserted event.
    pub fn entry_inserted(item: impl Into<String>) -> Self {
        SimulationEvent::EntryInserted {
            item: item.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a RemovalScheduled event.
    pub fn removal_scheduled(item: impl Into<String>, delay: Duration) -> Self {
        SimulationEvent::RemovalScheduled {
            item: item.into(),
            delay_ms: delay.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }

    /// Create a PolicyChanged event.
    pub fn policy_changed(from: EvictionPolicy, to: EvictionPolicy) -> Self {
        SimulationEvent::PolicyChanged {
            from,
            to,
            timestamp: Utc::now(),
        }
    }

    /// Create a SimulationReset event.
    pub fn simulation_reset(epoch: u64) -> Self {
        SimulationEvent::SimulationReset {
            epoch,
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
