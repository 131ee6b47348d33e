//! The per-tick step integrator.
//!
//! [`StepIntegrator::advance`] runs one fixed tick for one body: it gathers
//! the platform working set, then loops over bounded sub-steps of
//! contacts → cancellation → forces → integration → swept motion, and
//! finally restores every platform it touched.
//!
//! All caches (geometry query, move axes, best and last contact) live in the
//! integrator, so each simultaneously simulated body owns its own.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_math::Aabb;
use tumble_scene::{GeometrySource, ObjectMask, QueryResult};
use tumble_solver::{
    compute_move_forces, BodyState, ControlInput, MoveAxes, ProfileTuning, SimConfig, Termination,
};
use tumble_telemetry::{EventKind, PhysicsEvent};
use tumble_types::{constants, TumbleResult};

use crate::cache::QueryCache;
use crate::contact::{Contact, ContactSource, ImpactContact};
use crate::forces::external_forces;
use crate::manifold::{contact_bounds, find_contacts};
use crate::platforms::{first_platform_intersect, WorkingSet};
use crate::response::{apply_contact_forces, velocity_cancel, CancelFlags, ResponseContext};
use crate::sweep::{test_move, SweptSphere};

/// First mid-tick impact, for render interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovePathSample {
    pub position: DVec3,
    /// Fraction of the tick elapsed at the impact, in `(0, 1]`.
    pub fraction: f64,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Tick number this outcome belongs to.
    pub tick: u64,
    pub substeps: u32,
    /// Tick time actually simulated.
    pub consumed: f64,
    /// Tick time left when a cap stopped the loop.
    pub remaining: f64,
    /// Fraction of the tick spent touching something.
    pub contact_fraction: f64,
    /// Slip speed left at the support contact.
    pub slip: f64,
    pub first_impact: Option<MovePathSample>,
    /// Previous minus new position.
    pub delta: DVec3,
    /// Contacts in the last manifold of the tick.
    pub contact_count: usize,
    /// Most cancellation passes any single call needed.
    pub max_cancel_passes: u32,
    pub events: Vec<PhysicsEvent>,
}

impl TickOutcome {
    /// True when a cap stopped the tick with time left.
    pub fn truncated(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Advances one body through fixed ticks.
#[derive(Debug, Clone)]
pub struct StepIntegrator {
    config: SimConfig,
    tuning: ProfileTuning,
    cache: QueryCache,
    axes: MoveAxes,
    contacts: Vec<Contact>,
    best_contact: Option<Contact>,
    last_contact: Option<ImpactContact>,
    working_set: WorkingSet,
    scratch: QueryResult,
    tick: u64,
}

impl StepIntegrator {
    /// Creates an integrator after validating `config`.
    pub fn new(config: SimConfig) -> TumbleResult<Self> {
        config.validate()?;
        let tuning = config.profile.tuning();
        Ok(Self {
            config,
            tuning,
            cache: QueryCache::new(),
            axes: MoveAxes::new(),
            contacts: Vec::new(),
            best_contact: None,
            last_contact: None,
            working_set: WorkingSet::new(),
            scratch: QueryResult::default(),
            tick: 0,
        })
    }

    /// Turns the geometry query cache on or off. Results do not change.
    pub fn with_query_cache(mut self, enabled: bool) -> Self {
        self.cache = if enabled {
            QueryCache::new()
        } else {
            QueryCache::disabled()
        };
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tuning(&self) -> &ProfileTuning {
        &self.tuning
    }

    /// Contacts of the most recent manifold build.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Support contact chosen most recently while movement was enabled.
    pub fn best_contact(&self) -> Option<&Contact> {
        self.best_contact.as_ref()
    }

    /// Contact of the most recent swept impact.
    pub fn last_contact(&self) -> Option<&ImpactContact> {
        self.last_contact.as_ref()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Geometry queries issued since the last call.
    pub fn take_query_count(&mut self) -> u32 {
        let count = self.cache.refreshes();
        self.cache.reset_counter();
        count
    }

    /// Rebuilds the manifold at the body's current position.
    pub fn refresh_contacts(
        &mut self,
        body: &BodyState,
        source: &dyn GeometrySource,
    ) -> &[Contact] {
        let mut ignored = Vec::new();
        self.build_manifold(body, source, &mut ignored);
        &self.contacts
    }

    fn build_manifold(&mut self, body: &BodyState, source: &dyn GeometrySource, events: &mut Vec<EventKind>) {
        let bounds = contact_bounds(body.position, body.radius);
        let candidates = self.cache.fetch(
            source,
            &bounds,
            ObjectMask::COLLISION,
            true,
            Some(body.id),
            !self.working_set.is_empty(),
        );
        find_contacts(
            candidates,
            source,
            body.position,
            body.radius,
            body.velocity,
            self.tuning.clip_independent,
            &mut self.contacts,
            events,
        );
    }

    /// Runs one tick of `config.tick` seconds.
    ///
    /// The body's mass is re-derived from the config and the active
    /// modifiers first. Position, velocity and angular velocity are committed
    /// at the end. Every platform in the working set is back in its pre-tick
    /// state on return.
    pub fn advance(
        &mut self,
        body: &mut BodyState,
        input: &ControlInput,
        source: &mut dyn GeometrySource,
    ) -> TickOutcome {
        let dt = self.config.tick;
        let tick = self.tick;
        let mut kinds = vec![EventKind::TickBegin { dt }];

        self.axes.invalidate();
        body.apply_modifiers(&self.config.body, &self.config.modifiers);
        body.prev_position = body.position;
        let start = body.position;

        let velocity_reach = body.velocity * dt * constants::TICK_BOX_VELOCITY_SCALE;
        let tick_box = Aabb::around_sphere(body.position, body.radius)
            .swept(velocity_reach)
            .inflated(dt * constants::TICK_BOX_SLACK_RATE);
        self.working_set.gather(source, &tick_box, dt);

        self.cache.invalidate();
        if self.working_set.is_empty() {
            self.cache.fetch(&*source, &tick_box, ObjectMask::COLLISION, false, Some(body.id), false);
        }

        let config = self.config.clone();
        let tuning = self.tuning;
        let ctx = ResponseContext {
            config: &config.body,
            tuning: &tuning,
            modifiers: &config.modifiers,
        };

        let mut remaining = dt;
        let mut substeps = 0_u32;
        let mut contact_time = 0.0;
        let mut slip = 0.0;
        let mut max_cancel_passes = 0;
        let mut first_impact = None;
        let mut flags = CancelFlags::default();

        loop {
            if remaining == 0.0 {
                break;
            }
            if substeps >= config.body.substep_cap {
                tracing::warn!(tick, substeps, remaining, "sub-step safety cap reached");
                kinds.push(EventKind::SubstepCapReached { remaining });
                break;
            }
            if let Termination::IterationCap(cap) = tuning.termination {
                if substeps >= cap {
                    tracing::debug!(tick, substeps, remaining, "profile iteration cap reached");
                    kinds.push(EventKind::SubstepCapReached { remaining });
                    break;
                }
            }

            let step = remaining.min(config.body.max_substep);
            let moves = compute_move_forces(body, &config.body, &tuning, input, &mut self.axes);

            self.build_manifold(body, &*source, &mut kinds);

            flags.stopped_paths = false;
            let report = velocity_cancel(
                body,
                &mut self.contacts,
                &ctx,
                moves.is_centered,
                false,
                &mut flags,
                self.working_set.ids(),
                source,
                &mut kinds,
            );
            max_cancel_passes = max_cancel_passes.max(report.passes);

            let mut linear = external_forces(
                body,
                &self.contacts,
                &config.body,
                &config.modifiers,
                input,
                &mut self.axes,
                &*source,
                step,
            );
            let mut angular = DVec3::ZERO;
            let forces = apply_contact_forces(
                body,
                &mut self.contacts,
                &mut self.best_contact,
                &ctx,
                input,
                &moves,
                step,
                &mut linear,
                &mut angular,
                &mut kinds,
            );
            if let Some(s) = forces.slip {
                slip = s;
            }

            body.velocity += linear * step;
            body.omega += angular * step;

            if body.mode.axis_restricted {
                body.velocity = if tuning.restrict_keeps_vertical {
                    body.gravity_dir * body.velocity.dot(body.gravity_dir)
                } else {
                    DVec3::ZERO
                };
            }

            let report = velocity_cancel(
                body,
                &mut self.contacts,
                &ctx,
                moves.is_centered,
                true,
                &mut flags,
                self.working_set.ids(),
                source,
                &mut kinds,
            );
            max_cancel_passes = max_cancel_passes.max(report.passes);

            let mut move_time = step;
            first_platform_intersect(
                &self.working_set,
                &*source,
                body.position,
                body.velocity,
                body.radius,
                &self.contacts,
                &mut move_time,
                &mut self.scratch,
            );

            let sphere = SweptSphere {
                position: body.position,
                velocity: body.velocity,
                radius: body.radius,
                budget: move_time,
            };
            let outcome = test_move(
                &mut self.cache,
                &*source,
                &sphere,
                ObjectMask::COLLISION,
                false,
                Some(body.id),
                !self.working_set.is_empty(),
            );
            body.position = outcome.position;
            move_time = outcome.time;
            if let Some(impact) = outcome.impact {
                if let ContactSource::Static { object, shape: true } = impact.source {
                    kinds.push(EventKind::SurfaceCollision {
                        object: object.0,
                        material: impact.material.map(|m| m.0),
                        relative_velocity: body.velocity.to_array(),
                    });
                }
                self.last_contact = Some(impact);
            }

            if first_impact.is_none()
                && step * 0.99 > move_time
                && move_time > 0.001000000047497451
            {
                first_impact = Some(MovePathSample {
                    position: body.position,
                    fraction: (dt - remaining + move_time) / dt,
                });
            }

            let mut consumed = step;
            if step != move_time {
                let unspent = step - move_time;
                body.velocity -= linear * unspent;
                body.omega -= angular * unspent;
                consumed = move_time;
            }

            if !self.contacts.is_empty() {
                contact_time += consumed;
            }
            remaining -= consumed;

            self.working_set.sync(source, dt - remaining);
            substeps += 1;
        }

        self.working_set.release(source);

        let contact_fraction = contact_time / dt;
        kinds.push(EventKind::TickEnd {
            substeps,
            contact_fraction,
            slip,
        });
        tracing::trace!(tick, substeps, contact_fraction, "tick complete");

        self.tick += 1;
        TickOutcome {
            tick,
            substeps,
            consumed: dt - remaining,
            remaining,
            contact_fraction,
            slip,
            first_impact,
            delta: start - body.position,
            contact_count: self.contacts.len(),
            max_cancel_passes,
            events: kinds
                .into_iter()
                .map(|kind| PhysicsEvent::new(tick, kind))
                .collect(),
        }
    }
}
