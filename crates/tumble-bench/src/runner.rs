//! Benchmark runner: executes scenarios and collects metrics.

use std::time::Instant;

use tumble_contact::StepIntegrator;
use tumble_scene::SphereProxy;
use tumble_types::TumbleResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{BodySetup, Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

fn proxy(body: &BodySetup) -> SphereProxy {
    SphereProxy {
        id: body.state.id,
        position: body.state.position,
        velocity: body.state.velocity,
        radius: body.state.radius,
        mass: body.state.mass,
        bounce_restitution: body.bounce_restitution,
    }
}

impl BenchmarkRunner {
    /// Run a single scenario to completion.
    ///
    /// Bodies tick one after another, each seeing the others as spheres in
    /// the scene. Platforms run their own tick once every body is done.
    pub fn run(scenario: Scenario) -> TumbleResult<BenchmarkMetrics> {
        let Scenario {
            kind,
            config,
            mut scene,
            mut bodies,
            ticks,
        } = scenario;

        let mut integrators = bodies
            .iter()
            .map(|_| StepIntegrator::new(config.clone()))
            .collect::<TumbleResult<Vec<_>>>()?;
        for body in &bodies {
            scene.upsert_sphere(proxy(body));
        }

        let mut metrics = BenchmarkMetrics {
            scenario: kind.name().to_string(),
            bodies: bodies.len(),
            ticks,
            min_height: f64::INFINITY,
            ..BenchmarkMetrics::default()
        };
        let mut tick_times: Vec<f64> = Vec::with_capacity(ticks as usize);
        let total_start = Instant::now();

        for _ in 0..ticks {
            let tick_start = Instant::now();
            for (body, integrator) in bodies.iter_mut().zip(integrators.iter_mut()) {
                // Another body may have struck this one since its last tick.
                if let Some(seen) = scene.sphere(body.state.id) {
                    body.state.velocity = seen.velocity;
                }
                let outcome = integrator.advance(&mut body.state, &body.input, &mut scene);
                metrics.record(&outcome);
                metrics.queries += u64::from(integrator.take_query_count());
                metrics.max_speed = metrics.max_speed.max(body.state.velocity.length());
                metrics.min_height = metrics.min_height.min(body.state.height());
                scene.upsert_sphere(proxy(body));
            }
            scene.advance_platforms(config.tick);
            tick_times.push(tick_start.elapsed().as_secs_f64());
        }

        metrics.total_wall_time = total_start.elapsed().as_secs_f64();
        metrics.final_kinetic_energy = bodies.iter().map(|b| b.state.kinetic_energy()).sum();

        let body_ticks = (ticks as usize * bodies.len()).max(1);
        metrics.avg_substeps /= body_ticks as f64;
        if !tick_times.is_empty() {
            metrics.avg_tick_time = tick_times.iter().sum::<f64>() / tick_times.len() as f64;
            metrics.min_tick_time = tick_times.iter().copied().fold(f64::MAX, f64::min);
            metrics.max_tick_time = tick_times.iter().copied().fold(0.0, f64::max);
        }
        if metrics.min_height.is_infinite() {
            metrics.min_height = 0.0;
        }

        tracing::debug!(
            scenario = %kind,
            ticks,
            wall_time = metrics.total_wall_time,
            bounces = metrics.bounces,
            "benchmark scenario complete"
        );
        Ok(metrics)
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all() -> TumbleResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(Scenario::from_kind(kind)?))
            .collect()
    }
}
