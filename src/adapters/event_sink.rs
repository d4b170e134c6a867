//! Event Sink Adapters
//!
//! Where simulation events end up: the tracing log, an in-memory history
//! for the CLI report and tests, or several of these at once.

use std::sync::Arc;

use tracing::{debug, info, warn, Level};

use crate::domain::events::SimulationEvent;
use crate::domain::ports::EventSink;

/// Writes each event to the tracing log.
///
/// The event type and drink are separate fields so they can be filtered on;
/// the full event follows as JSON.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::debug_level()
    }
}

impl LoggingEventSink {
    /// Log order and cache events at info level, for interactive runs
    pub fn info_level() -> Self {
        Self { level: Level::INFO }
    }

    /// Log at debug level, alongside the controller's own info lines
    pub fn debug_level() -> Self {
        Self { level: Level::DEBUG }
    }
}

impl EventSink for LoggingEventSink {
    fn publish(&self, event: SimulationEvent) {
        let event_type = event.event_type();
        let item = event.item();
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                warn!(event_type, error = %e, "Event not serializable");
                return;
            }
        };

        if self.level == Level::INFO {
            info!(event_type, item, event = %json, "Simulation event");
        } else {
            debug!(event_type, item, event = %json, "Simulation event");
        }
    }
}

/// Keeps the session's event history in publication order.
///
/// The CLI counts it for the run report; tests query it by event type
/// (`"EntryEvicted"`, `"RemovalScheduled"` and so on).
#[derive(Debug, Default)]
pub struct InMemoryEventCollector {
    events: parking_lot::RwLock<Vec<SimulationEvent>>,
}

impl InMemoryEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the history so far
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Forget the history, e.g. between compared sessions
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Events whose `event_type()` equals `event_type`, oldest first
    pub fn events_of_type(&self, event_type: &str) -> Vec<SimulationEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn count_of_type(&self, event_type: &str) -> usize {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }
}

impl EventSink for InMemoryEventCollector {
    fn publish(&self, event: SimulationEvent) {
        self.events.write().push(event);
    }

    fn publish_all(&self, events: Vec<SimulationEvent>) {
        self.events.write().extend(events);
    }
}

// Lets a caller keep a handle on a collector it hands to the controller
impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, event: SimulationEvent) {
        (**self).publish(event);
    }

    fn publish_all(&self, events: Vec<SimulationEvent>) {
        (**self).publish_all(events);
    }
}

/// Hands every event to each registered sink, in registration order.
///
/// The CLI pairs a [`LoggingEventSink`] with an [`InMemoryEventCollector`].
#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` after the ones already added
    pub fn with_sink<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for CompositeEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeEventSink")
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl EventSink for CompositeEventSink {
    fn publish(&self, event: SimulationEvent) {
        for sink in &self.sinks {
            sink.publish(event.clone());
        }
    }

    fn publish_all(&self, events: Vec<SimulationEvent>) {
        for sink in &self.sinks {
            sink.publish_all(events.clone());
        }
    }
}
