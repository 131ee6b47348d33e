//! State snapshot serialization for replay and debugging.
//!
//! Snapshots capture every body's state at the end of a tick, enabling
//! deterministic replay and diff-based debugging.

use serde::{Deserialize, Serialize};
use tumble_solver::BodyState;
use tumble_types::{TumbleError, TumbleResult};

/// State of every simulated body after one tick.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Ticks completed when this snapshot was taken.
    pub tick: u64,
    /// Simulation time in seconds.
    pub sim_time: f64,
    pub bodies: Vec<BodyState>,
}

impl TickSnapshot {
    pub fn capture(tick: u64, tick_length: f64, bodies: &[BodyState]) -> Self {
        Self {
            tick,
            sim_time: tick as f64 * tick_length,
            bodies: bodies.to_vec(),
        }
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> TumbleResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| TumbleError::Serialization(format!("snapshot encoding failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> TumbleResult<Self> {
        bincode::deserialize(data)
            .map_err(|e| TumbleError::Serialization(format!("snapshot decoding failed: {e}")))
    }

    /// Largest position difference between matching bodies of two snapshots.
    ///
    /// Bodies are matched by id; a body missing from `other` counts as an
    /// infinite difference.
    pub fn max_position_error(&self, other: &TickSnapshot) -> f64 {
        self.bodies
            .iter()
            .map(|body| {
                other
                    .bodies
                    .iter()
                    .find(|b| b.id == body.id)
                    .map_or(f64::INFINITY, |b| b.position.distance(body.position))
            })
            .fold(0.0, f64::max)
    }
}
