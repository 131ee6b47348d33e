//! Moving platforms during a tick.
//!
//! The [`WorkingSet`] holds the ids of every platform that could reach the
//! body this tick. Each is pushed on entry, moved in lock-step with the
//! sub-steps, and popped on exit, so the platform's own tick sees the state
//! it had before.

use glam::DVec3;
use tumble_math::Aabb;
use tumble_scene::{GeometrySource, QueryResult};
use tumble_types::{constants, PlatformId};

use crate::contact::Contact;
use crate::sweep::{sweep, SweptSphere};

/// Platforms taking part in the current tick.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    ids: Vec<PlatformId>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes and prepares every platform whose swept box overlaps `tick_box`.
    pub fn gather(&mut self, source: &mut dyn GeometrySource, tick_box: &Aabb, dt: f64) {
        self.ids.clear();
        for id in source.platform_ids() {
            let Some(platform) = source.platform_mut(id) else {
                continue;
            };
            if !tick_box.overlaps(&platform.extruded_box()) {
                continue;
            }
            platform.push_tick_state();
            platform.compute_next_path_step(dt);
            self.ids.push(id);
        }
        if !self.ids.is_empty() {
            tracing::trace!(platforms = self.ids.len(), "platform working set gathered");
        }
    }

    pub fn ids(&self) -> &[PlatformId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Moves every platform to `elapsed` seconds into the tick.
    pub fn sync(&self, source: &mut dyn GeometrySource, elapsed: f64) {
        for &id in &self.ids {
            if let Some(platform) = source.platform_mut(id) {
                platform.reset_tick_state();
                platform.advance(elapsed);
            }
        }
    }

    /// Pops every platform and empties the set.
    pub fn release(&mut self, source: &mut dyn GeometrySource) {
        for id in self.ids.drain(..) {
            if let Some(platform) = source.platform_mut(id) {
                platform.pop_tick_state();
            }
        }
    }
}

/// Shortens `budget` to the first time the body would strike a platform it
/// is not already touching.
///
/// Each platform is swept in its own frame: the body moves at its velocity
/// relative to the platform against that platform's polygons only.
#[allow(clippy::too_many_arguments)]
pub fn first_platform_intersect(
    working_set: &WorkingSet,
    source: &dyn GeometrySource,
    position: DVec3,
    velocity: DVec3,
    radius: f64,
    contacts: &[Contact],
    budget: &mut f64,
    scratch: &mut QueryResult,
) {
    if working_set.is_empty() {
        return;
    }
    let reach = Aabb::around_sphere(position, radius)
        .inflated(constants::SWEEP_BOX_SLACK)
        .swept(velocity * *budget);

    for &id in working_set.ids() {
        let Some(platform) = source.platform(id) else {
            continue;
        };
        let extruded = platform.extruded_box();
        if !extruded.overlaps(&reach) {
            continue;
        }
        if contacts.iter().any(|c| c.source.platform() == Some(id)) {
            continue;
        }

        scratch.clear();
        platform.build_poly_list(&extruded, &mut scratch.soup);
        let sphere = SweptSphere {
            position,
            velocity: velocity - platform.velocity(),
            radius,
            budget: *budget,
        };
        let outcome = sweep(scratch, source, &sphere, false);
        *budget = outcome.time;
    }
}
