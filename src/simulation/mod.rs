//! Order Simulation
//!
//! The coffee-counter side of the simulator: orders are looked up in the
//! cache, prepared for a simulated duration and then applied to it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    SimulationController                      │
//! │   submit_*  │  manual_evict  │  set_policy  │  reset  │  snapshot
//! └──────┬───────────────────────────────────────────────┬───────┘
//!        │ session lock                                   │ EventSink
//!        ▼                                                ▼
//! ┌────────────────┐   ┌────────────┐   ┌────────────────────────┐
//! │ OrderProcessor │──▶│ CacheStore │   │ StatisticsAggregator   │
//! │ (state machine)│   └────────────┘   │ (per-policy counters)  │
//! └───────┬────────┘                     └────────────────────────┘
//!         │ timed phases: tokio tasks tagged with the session epoch
//! ```

mod controller;
mod order;
mod snapshot;
mod stats;

pub use controller::SimulationController;
pub use order::{Completion, Order, OrderPhase, OrderProcessor, OrderStep};
pub use snapshot::{PendingRemoval, SimulationSnapshot};
pub use stats::{
    PolicyStatistics, PolicyStatisticsSnapshot, StatisticsAggregator, StatisticsSnapshot,
};
