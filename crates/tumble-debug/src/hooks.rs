//! Inspection hooks for live debugging.
//!
//! A driver calls its inspectors around every tick of
//! [`StepIntegrator::advance`](tumble_contact::StepIntegrator::advance) to
//! capture events or trajectories without touching the integrator itself.

use glam::DVec3;
use tumble_contact::TickOutcome;
use tumble_solver::BodyState;
use tumble_telemetry::PhysicsEvent;

/// Observer of the tick loop.
///
/// # Lifecycle
///
/// ```text
/// for each tick:
///   inspector.on_tick_begin(...)
///   integrator.advance(...)
///   inspector.on_tick_end(...)
/// inspector.on_run_end()
/// ```
pub trait TickInspector {
    /// Called before the tick runs.
    fn on_tick_begin(&mut self, tick: u64, body: &BodyState) {
        let _ = (tick, body);
    }

    /// Called after the tick with the committed body state.
    fn on_tick_end(&mut self, body: &BodyState, outcome: &TickOutcome) {
        let _ = (body, outcome);
    }

    /// Called when the run completes.
    fn on_run_end(&mut self) {}

    /// Returns the inspector's name for logging.
    fn name(&self) -> &str;
}

/// Keeps every event a tick produced, optionally filtered by kind name.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<PhysicsEvent>,
    only: Option<Vec<&'static str>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records only events whose [`PhysicsEvent::kind_name`] is listed.
    pub fn only(kinds: &[&'static str]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    /// Drains collected events for dispatch.
    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TickInspector for EventRecorder {
    fn on_tick_end(&mut self, _body: &BodyState, outcome: &TickOutcome) {
        let only = self.only.as_deref();
        self.events.extend(
            outcome
                .events
                .iter()
                .filter(|e| only.map_or(true, |kinds| kinds.contains(&e.kind_name())))
                .cloned(),
        );
    }

    fn name(&self) -> &str {
        "event_recorder"
    }
}

/// One committed tick of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub tick: u64,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Sub-steps the tick ran.
    pub substeps: u32,
    /// Contacts in the tick's last manifold.
    pub contacts: usize,
}

/// Records the body's state after every tick.
#[derive(Debug, Default)]
pub struct TrajectoryRecorder {
    points: Vec<TrajectoryPoint>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Lowest height reached along `up`.
    pub fn min_height(&self, up: DVec3) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.position.dot(up))
            .min_by(f64::total_cmp)
    }

    /// Highest speed seen at the end of any tick.
    pub fn max_speed(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.velocity.length())
            .fold(0.0, f64::max)
    }
}

impl TickInspector for TrajectoryRecorder {
    fn on_tick_end(&mut self, body: &BodyState, outcome: &TickOutcome) {
        self.points.push(TrajectoryPoint {
            tick: outcome.tick,
            position: body.position,
            velocity: body.velocity,
            substeps: outcome.substeps,
            contacts: outcome.contact_count,
        });
    }

    fn on_run_end(&mut self) {
        tracing::debug!(ticks = self.points.len(), "trajectory recorded");
    }

    fn name(&self) -> &str {
        "trajectory_recorder"
    }
}
