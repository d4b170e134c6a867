//! Infrastructure Adapters
//!
//! Implementations of the domain ports, following the Port/Adapter
//! (Hexagonal) architecture pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                              │
//! │                  EventSink (port trait)                          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  LoggingEventSink │ InMemoryEventCollector │ CompositeEventSink │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod event_sink;

pub use event_sink::{CompositeEventSink, InMemoryEventCollector, LoggingEventSink};
