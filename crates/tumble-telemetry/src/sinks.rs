//! Pluggable event sinks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::events::PhysicsEvent;

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &PhysicsEvent);

    /// Called when the simulation ends.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// Clones share the same buffer, so a test keeps one clone and hands the
/// other to the bus.
#[derive(Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<PhysicsEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far.
    pub fn events(&self) -> Vec<PhysicsEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &PhysicsEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events using the `tracing` crate.
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &PhysicsEvent) {
        tracing::info!(
            tick = event.tick,
            event = ?event.kind,
            "physics_event"
        );
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}

/// Counts events per kind; the summary is logged on finalize.
#[derive(Clone, Default)]
pub struct CountingSink {
    counts: Arc<Mutex<BTreeMap<&'static str, u64>>>,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events of a kind (see [`PhysicsEvent::kind_name`]).
    pub fn count(&self, kind: &str) -> u64 {
        self.snapshot().get(kind).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        match self.counts.lock() {
            Ok(counts) => counts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for CountingSink {
    fn handle(&mut self, event: &PhysicsEvent) {
        let mut counts = match self.counts.lock() {
            Ok(counts) => counts,
            Err(poisoned) => poisoned.into_inner(),
        };
        *counts.entry(event.kind_name()).or_insert(0) += 1;
    }

    fn finalize(&mut self) {
        for (kind, count) in self.snapshot() {
            tracing::info!(kind, count, "event_count");
        }
    }

    fn name(&self) -> &str {
        "counting_sink"
    }
}
