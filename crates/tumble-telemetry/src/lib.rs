//! # tumble-telemetry
//!
//! Fire-and-forget effect notifications and diagnostics for the physics
//! core: bounces, jumps, first contacts with shapes, recoverable cap hits,
//! and per-tick roll statistics. Events flow through an [`EventBus`] to
//! pluggable sinks (in-memory, `tracing`, counters).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{BounceStrength, EventKind, PhysicsEvent};
pub use sinks::{CountingSink, EventSink, TracingSink, VecSink};
