//! Event bus: broadcast-style event dispatch with pluggable sinks.
//!
//! The bus uses `std::sync::mpsc` for thread-safe event delivery.
//! Sinks are registered once at initialization and receive events on flush.

use std::sync::mpsc;

use crate::events::PhysicsEvent;
use crate::sinks::EventSink;

/// Broadcast event bus for physics telemetry.
///
/// The producer side (`emit`) queues events; `flush` hands them to every
/// registered sink in order.
pub struct EventBus {
    sender: mpsc::Sender<PhysicsEvent>,
    receiver: mpsc::Receiver<PhysicsEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Whether the bus is active. Disabled bus is a no-op.
    enabled: bool,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. Disabled bus drops events silently.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. If the bus is disabled, this is a no-op.
    pub fn emit(&self, event: PhysicsEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives as long as the bus.
        let _ = self.sender.send(event);
    }

    /// Emits every event of a batch, in order.
    pub fn emit_all(&self, events: impl IntoIterator<Item = PhysicsEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Flush all pending events to registered sinks.
    ///
    /// Call this at the end of each tick or at shutdown.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Flushes pending events and finalizes every sink.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
