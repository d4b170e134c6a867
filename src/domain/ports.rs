//! Domain Ports (Port/Adapter Pattern)
//!
//! Value objects shared across the simulation and the trait abstractions the
//! controller depends on. Adapters in [`crate::adapters`] provide concrete
//! implementations.
//!
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │      SimulationController     │──────▶│  EventSink (port)             │
//! └──────────────────────────────┘        └──────────────────────────────┘
//!                                                       │
//!                                   ┌───────────────────┴─────────────────┐
//!                                   ▼                                     ▼
//!                          LoggingEventSink                   InMemoryEventCollector
//! ```

use serde::{Deserialize, Serialize};

use super::events::SimulationEvent;

// =============================================================================
// Value Objects
// =============================================================================

/// Order identifier, unique and increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// The identifier following this one
    pub fn next(self) -> Self {
        OrderId(self.0 + 1)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of the cache lookup for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOutcome {
    /// Served from cache
    Hit,
    /// Prepared fresh and inserted into the cache
    Miss,
}

impl OrderOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, OrderOutcome::Hit)
    }
}

impl std::fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderOutcome::Hit => write!(f, "Hit"),
            OrderOutcome::Miss => write!(f, "Miss"),
        }
    }
}

// =============================================================================
// Event Sink Port
// =============================================================================

/// Receives simulation events as they happen.
///
/// Called while the session lock is held, so implementations must not call
/// back into the controller.
pub trait EventSink: Send + Sync {
    /// Publish a single event.
    fn publish(&self, event: SimulationEvent);

    /// Publish several events in order.
    fn publish_all(&self, events: Vec<SimulationEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
