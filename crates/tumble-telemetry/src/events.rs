//! Physics event types.
//!
//! Events are lightweight value types tagged with the tick that produced
//! them. Vectors are plain arrays so consumers need no math crate.

use serde::{Deserialize, Serialize};

/// An event emitted by the physics core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsEvent {
    /// Tick number (0-indexed).
    pub tick: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// How hard a bounce was, for picking effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BounceStrength {
    /// Below every threshold; no effect is played.
    None,
    Soft,
    Medium,
    Hard,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Tick started.
    TickBegin {
        /// Tick length (seconds).
        dt: f64,
    },

    /// Tick completed.
    TickEnd {
        /// Sub-steps run.
        substeps: u32,
        /// Fraction of the tick spent touching something.
        contact_fraction: f64,
        /// Slip speed left at the support contact.
        slip: f64,
    },

    /// First penetrating contact of the tick.
    Bounce {
        /// Closing speed at the contact.
        speed: f64,
        normal: [f64; 3],
        material: Option<u16>,
        strength: BounceStrength,
    },

    /// Jump impulse applied.
    Jump {
        /// Velocity added along the support normal.
        impulse: f64,
    },

    /// First contact with an (object, material) pair in a manifold build.
    SurfaceCollision {
        object: u32,
        material: Option<u16>,
        relative_velocity: [f64; 3],
    },

    /// Contact with another dynamic sphere.
    BodyCollision {
        other: u32,
        relative_velocity: [f64; 3],
    },

    /// Velocity cancellation gave up before resolving every contact.
    ContactPassCapReached {
        passes: u32,
    },

    /// The sub-step loop stopped with time left.
    SubstepCapReached {
        /// Unconsumed tick time (seconds).
        remaining: f64,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl PhysicsEvent {
    /// Creates a new event for the given tick.
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self { tick, kind }
    }

    /// Short stable name of the event kind.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EventKind::TickBegin { .. } => "tick_begin",
            EventKind::TickEnd { .. } => "tick_end",
            EventKind::Bounce { .. } => "bounce",
            EventKind::Jump { .. } => "jump",
            EventKind::SurfaceCollision { .. } => "surface_collision",
            EventKind::BodyCollision { .. } => "body_collision",
            EventKind::ContactPassCapReached { .. } => "contact_pass_cap",
            EventKind::SubstepCapReached { .. } => "substep_cap",
            EventKind::Custom { .. } => "custom",
        }
    }
}
