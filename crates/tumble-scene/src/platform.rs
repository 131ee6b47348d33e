//! Moving platforms.
//!
//! A platform advances along its own path once per tick. Within a tick the
//! collision core pushes its state, lets it move in lock-step with the
//! sub-steps, and pops it again on exit, so the platform's own tick sees
//! exactly the state it had before.

use glam::DVec3;
use tumble_math::Aabb;
use tumble_types::{ObjectId, PlatformId};

use crate::soup::PolySoup;

/// Kinematic interface of a moving platform.
pub trait MovingPlatform {
    fn id(&self) -> PlatformId;

    /// Saves path time, position, velocity and swept box.
    fn push_tick_state(&mut self);

    /// Computes the velocity and swept box for the next `dt` seconds of path.
    fn compute_next_path_step(&mut self, dt: f64);

    /// Moves back to the position saved by [`MovingPlatform::push_tick_state`].
    fn reset_tick_state(&mut self);

    /// Moves `elapsed` seconds from the saved position at the current velocity,
    /// honouring a stop requested by [`MovingPlatform::set_stopped`].
    fn advance(&mut self, elapsed: f64);

    /// Restores everything saved by [`MovingPlatform::push_tick_state`].
    fn pop_tick_state(&mut self);

    /// Freezes the platform at its current tick time for the rest of the tick.
    fn set_stopped(&mut self);

    /// World box swept over the current path step.
    fn extruded_box(&self) -> Aabb;

    /// Linear velocity over the current path step.
    fn velocity(&self) -> DVec3;

    /// Appends the platform's world-space polygons overlapping `bounds`.
    fn build_poly_list(&self, bounds: &Aabb, out: &mut PolySoup);
}

#[derive(Debug, Clone, Copy)]
struct SavedState {
    path_time: f64,
    position: DVec3,
    velocity: DVec3,
    extruded: Aabb,
    stop_time: f64,
}

/// A platform shuttling between two points at constant speed.
///
/// The path runs `start → end → start` and repeats. A platform with
/// `start == end` or zero speed stays put.
#[derive(Debug, Clone)]
pub struct LinearPlatform {
    id: PlatformId,
    object: ObjectId,
    /// Polygons relative to the platform origin.
    local: PolySoup,
    local_bounds: Aabb,
    start: DVec3,
    end: DVec3,
    speed: f64,
    path_time: f64,
    position: DVec3,
    velocity: DVec3,
    extruded: Aabb,
    /// Tick-relative time at which the platform stops; infinite when running.
    stop_time: f64,
    /// Tick-relative time of the last advance.
    advance_time: f64,
    saved: Option<SavedState>,
}

impl LinearPlatform {
    /// Creates a platform at `start` whose polygons are given relative to
    /// its origin.
    pub fn new(
        id: PlatformId,
        object: ObjectId,
        local: PolySoup,
        start: DVec3,
        end: DVec3,
        speed: f64,
    ) -> Self {
        let local_bounds = local.bounds().unwrap_or(Aabb::ZERO);
        let extruded = local_bounds.translated(start);
        Self {
            id,
            object,
            local,
            local_bounds,
            start,
            end,
            speed,
            path_time: 0.0,
            position: start,
            velocity: DVec3::ZERO,
            extruded,
            stop_time: f64::INFINITY,
            advance_time: 0.0,
            saved: None,
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// World box at the current position.
    pub fn world_box(&self) -> Aabb {
        self.local_bounds.translated(self.position)
    }

    /// Duration of one leg of the path, zero for a stationary platform.
    fn leg_time(&self) -> f64 {
        let length = (self.end - self.start).length();
        if self.speed <= 0.0 || length == 0.0 {
            0.0
        } else {
            length / self.speed
        }
    }

    /// Position along the path at path time `t`.
    pub fn path_position(&self, t: f64) -> DVec3 {
        let leg = self.leg_time();
        if leg == 0.0 {
            return self.start;
        }
        let phase = t.rem_euclid(2.0 * leg);
        let s = if phase <= leg { phase / leg } else { 2.0 - phase / leg };
        self.start.lerp(self.end, s)
    }

    /// Runs the platform's own tick: moves `dt` seconds along the path.
    pub fn advance_path(&mut self, dt: f64) {
        self.path_time += dt;
        self.position = self.path_position(self.path_time);
    }
}

impl MovingPlatform for LinearPlatform {
    fn id(&self) -> PlatformId {
        self.id
    }

    fn push_tick_state(&mut self) {
        self.saved = Some(SavedState {
            path_time: self.path_time,
            position: self.position,
            velocity: self.velocity,
            extruded: self.extruded,
            stop_time: self.stop_time,
        });
    }

    fn compute_next_path_step(&mut self, dt: f64) {
        self.advance_time = 0.0;
        let next = self.path_position(self.path_time + dt);
        let displacement = next - self.position;
        self.extruded = self.world_box().swept(displacement);
        self.velocity = if dt > 0.0 { displacement / dt } else { DVec3::ZERO };
    }

    fn reset_tick_state(&mut self) {
        self.advance_time = 0.0;
        if let Some(saved) = self.saved {
            self.position = saved.position;
        }
    }

    fn advance(&mut self, elapsed: f64) {
        self.advance_time = elapsed;
        let moving = elapsed.min(self.stop_time);
        if moving > 0.0 {
            self.position += self.velocity * moving;
        }
    }

    fn pop_tick_state(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.path_time = saved.path_time;
            self.position = saved.position;
            self.velocity = saved.velocity;
            self.extruded = saved.extruded;
            self.stop_time = saved.stop_time;
        }
        self.advance_time = 0.0;
    }

    fn set_stopped(&mut self) {
        self.stop_time = self.stop_time.min(self.advance_time);
    }

    fn extruded_box(&self) -> Aabb {
        self.extruded
    }

    fn velocity(&self) -> DVec3 {
        self.velocity
    }

    fn build_poly_list(&self, bounds: &Aabb, out: &mut PolySoup) {
        out.append_overlapping(&self.local, bounds, self.position);
    }
}
