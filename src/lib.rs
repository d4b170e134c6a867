//! ByteBrew - Cache Eviction Simulator
//!
//! A bounded cache with pluggable eviction policies, driven by a coffee shop
//! order counter. Drinks are cache entries; orders either hit a ready drink
//! or miss and brew a fresh one, evicting when the counter is full.
//!
//! # Architecture
//!
//! ```text
//! SimulationController → OrderProcessor → CacheStore ← EvictionPolicy
//!          │
//!          └──▶ StatisticsAggregator     EventSink → adapters
//! ```
//!
//! # Features
//!
//! - LRU, FIFO and LFU eviction over a logical clock
//! - Timed order phases on tokio, cancelled by reset
//! - Per-policy hit-rate statistics
//! - Manual removal with an announced delay
//! - Cached vs uncached impact estimates
//!
//! # Modules
//!
//! - [`adapters`] - Event sink implementations
//! - [`cache`] - Cache store and eviction policies
//! - [`config`] - Session configuration
//! - [`domain`] - Value objects, events and ports
//! - [`error`] - Error types
//! - [`impact`] - Hit rate impact estimator
//! - [`simulation`] - Order processor, statistics and controller

pub mod adapters;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod impact;
pub mod simulation;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheStore, EvictionEvent, EvictionPolicy};
pub use config::SimulationConfig;
pub use domain::{EventSink, OrderId, OrderOutcome, SimulationEvent};
pub use error::{Error, Result};
pub use simulation::{OrderPhase, SimulationController, SimulationSnapshot};
