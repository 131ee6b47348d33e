//! # tumble-contact
//!
//! Continuous collision and contact handling for a rolling sphere.
//!
//! Each tick is split into bounded sub-steps, and each sub-step runs the same
//! pipeline:
//! 1. **Manifold**: Gather every surface within reach ([`find_contacts`])
//! 2. **Response**: Cancel penetrating velocity, then resolve friction and
//!    rolling against the best contact ([`velocity_cancel`],
//!    [`apply_contact_forces`])
//! 3. **Swept motion**: Move to the earliest time of impact ([`test_move`])
//!
//! [`StepIntegrator`] owns the per-body caches and drives the loop; moving
//! platforms join the tick through a [`WorkingSet`].

pub mod cache;
pub mod contact;
pub mod forces;
pub mod integrator;
pub mod manifold;
pub mod platforms;
pub mod response;
pub mod sweep;

pub use cache::QueryCache;
pub use contact::{Contact, ContactSource, ImpactContact};
pub use forces::external_forces;
pub use integrator::{MovePathSample, StepIntegrator, TickOutcome};
pub use manifold::find_contacts;
pub use platforms::{first_platform_intersect, WorkingSet};
pub use response::{
    apply_contact_forces, bounce_strength, velocity_cancel, CancelFlags, CancelReport, ForceReport,
    ResponseContext,
};
pub use sweep::{sweep, test_move, SweepOutcome, SweptSphere};
