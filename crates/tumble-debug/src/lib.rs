//! # tumble-debug
//!
//! Tick inspectors and body snapshots for debugging collision issues.
//! Snapshots serialize every body's full state to binary so a run can be
//! resumed from any tick and diffed against a replay.

pub mod hooks;
pub mod snapshot;

pub use hooks::{EventRecorder, TickInspector, TrajectoryRecorder};
pub use snapshot::TickSnapshot;
