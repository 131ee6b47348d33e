//! # tumble-solver
//!
//! Everything the rolling body brings into a tick: its tuning, its state and
//! the player's intent.
//!
//! ## Key Types
//!
//! - [`BodyConfig`]: Friction, acceleration and bounce tuning of the body
//! - [`PhysicsProfile`] / [`ProfileTuning`]: Named tuning profiles and the
//!   explicit behaviour flags each one resolves to
//! - [`SimConfig`]: Tick length, profile and body config, loadable from TOML
//! - [`BodyState`]: Position, velocity, angular velocity and mode flags
//! - [`ControlInput`] / [`MoveAxes`]: Move intent and the cached camera axes
//!   it is expressed in

pub mod config;
pub mod control;
pub mod profile;
pub mod state;

pub use config::{BodyConfig, Modifiers, SimConfig};
pub use control::{compute_move_forces, ControlInput, MoveAxes, MoveForces};
pub use profile::{PhysicsProfile, ProfileTuning, Termination};
pub use state::{BodyState, ModeFlags};
