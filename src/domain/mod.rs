//! Domain Layer
//!
//! Value objects, events and ports shared by the simulation and its adapters.
//!
//! - **Ports** (`ports.rs`) - value objects and the [`EventSink`] trait
//! - **Events** (`events.rs`) - [`SimulationEvent`] records for audit and UI feeds
//!
//! ```ignore
//! use bytebrew::domain::{EventSink, SimulationEvent};
//!
//! struct Printer;
//!
//! impl EventSink for Printer {
//!     fn publish(&self, event: SimulationEvent) {
//!         println!("{}", event.event_type());
//!     }
//! }
//! ```

pub mod events;
pub mod ports;

// Re-export commonly used types
pub use events::SimulationEvent;
pub use ports::{EventSink, OrderId, OrderOutcome};
