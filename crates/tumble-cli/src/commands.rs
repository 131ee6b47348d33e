//! CLI command implementations.

use std::error::Error;
use std::path::{Path, PathBuf};

use glam::DVec3;
use tumble_bench::metrics::BenchmarkMetrics;
use tumble_bench::runner::BenchmarkRunner;
use tumble_bench::scenarios::{Scenario, ScenarioKind};
use tumble_contact::StepIntegrator;
use tumble_debug::hooks::{TickInspector, TrajectoryRecorder};
use tumble_debug::snapshot::TickSnapshot;
use tumble_scene::generators::floor_quad;
use tumble_scene::{SceneFile, StaticScene};
use tumble_solver::{BodyState, ControlInput, PhysicsProfile, SimConfig};
use tumble_telemetry::{CountingSink, EventBus, PhysicsEvent, TracingSink, VecSink};
use tumble_types::BodyId;

type CliResult = Result<(), Box<dyn Error>>;

/// Options of `tumble simulate`.
pub struct SimulateArgs {
    pub config: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    pub ticks: u32,
    pub profile: Option<String>,
    pub start: Vec<f64>,
    pub forward: f64,
    pub snapshot: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub trace_events: bool,
}

fn default_scene() -> Result<StaticScene, Box<dyn Error>> {
    let mut scene = StaticScene::new();
    scene.add_object(false, None, &[floor_quad(50.0, 0.0)])?;
    Ok(scene)
}

/// Run a simulation of one body.
pub fn simulate(args: &SimulateArgs) -> CliResult {
    println!("tumble simulation");
    println!("─────────────────");

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(name) = &args.profile {
        config.profile = name.parse::<PhysicsProfile>()?;
    }
    let mut scene = match &args.scene {
        Some(path) => SceneFile::load(path)?.build()?,
        None => default_scene()?,
    };
    let [x, y, z] = args.start[..] else {
        return Err("--start needs exactly three values".into());
    };

    println!("Profile:  {}", config.profile);
    println!("Tick:     {}s", config.tick);
    println!("Scene:    {} objects, {} polygons", scene.object_count(), scene.polygon_count());
    println!();

    let mut bus = EventBus::new();
    let counts = CountingSink::new();
    bus.add_sink(Box::new(counts.clone()));
    if args.trace_events {
        bus.add_sink(Box::new(TracingSink::new()));
    }
    let recorded = args.events.as_ref().map(|_| VecSink::new());
    if let Some(sink) = &recorded {
        bus.add_sink(Box::new(sink.clone()));
    }

    tracing::debug!(ticks = args.ticks, profile = %config.profile, "starting simulation");
    let mut integrator = StepIntegrator::new(config.clone())?;
    // Id 0 is the simulated body; scene spheres start at 1.
    let mut body = BodyState::new(BodyId(0), &config.body, DVec3::new(x, y, z));
    let input = ControlInput::forward(args.forward.clamp(-1.0, 1.0));
    let mut trajectory = TrajectoryRecorder::new();

    for tick in 0..u64::from(args.ticks) {
        trajectory.on_tick_begin(tick, &body);
        let outcome = integrator.advance(&mut body, &input, &mut scene);
        trajectory.on_tick_end(&body, &outcome);
        bus.emit_all(outcome.events);
        bus.flush();
        scene.advance_platforms(config.tick);
    }
    trajectory.on_run_end();
    bus.finish();

    println!("Final position:  {:.4?}", body.position.to_array());
    println!("Final velocity:  {:.4?}", body.velocity.to_array());
    println!("Max speed:       {:.4}", trajectory.max_speed());
    if let Some(lowest) = trajectory.min_height(-body.gravity_dir) {
        println!("Lowest height:   {lowest:.4}");
    }
    println!("Bounces:         {}", counts.count("bounce"));
    println!("Jumps:           {}", counts.count("jump"));
    println!("Capped ticks:    {}", counts.count("substep_cap"));

    if let (Some(path), Some(sink)) = (&args.events, &recorded) {
        let events = sink.events();
        std::fs::write(path, events_to_json_lines(&events)?)?;
        println!("{} events written to: {}", events.len(), path.display());
    }

    if let Some(path) = &args.snapshot {
        let snapshot = TickSnapshot::capture(integrator.ticks(), config.tick, &[body]);
        std::fs::write(path, snapshot.to_bytes()?)?;
        println!("Snapshot written to: {}", path.display());
    }

    Ok(())
}

fn events_to_json_lines(events: &[PhysicsEvent]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    Ok(out)
}

/// Run benchmark suite.
pub fn benchmark(scenario_name: &str, output_path: Option<&Path>) -> CliResult {
    println!("tumble benchmark suite");
    println!("══════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_name.parse()?]
    };

    let mut all_metrics = Vec::new();
    for &kind in &scenarios {
        let scenario = Scenario::from_kind(kind)?;
        println!(
            "Running: {} ({} bodies, {} polygons, {} ticks)",
            kind,
            scenario.bodies.len(),
            scenario.scene.polygon_count(),
            scenario.ticks,
        );

        let metrics = BenchmarkRunner::run(scenario).map_err(|e| format!("Benchmark failed: {e}"))?;
        tracing::debug!(scenario = %kind, wall_time = metrics.total_wall_time, "benchmark finished");

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg tick:      {:.3}ms", metrics.avg_tick_time * 1000.0);
        println!("  Avg substeps:  {:.2}", metrics.avg_substeps);
        println!("  Bounces:       {}", metrics.bounces);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!();

        all_metrics.push(metrics);
    }

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {}", path.display());
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Inspect a state snapshot.
pub fn inspect(path: &Path) -> CliResult {
    println!("tumble snapshot inspector");
    println!("─────────────────────────");
    println!();

    let data = std::fs::read(path)?;
    let snapshot = TickSnapshot::from_bytes(&data)?;

    println!("Tick:         {}", snapshot.tick);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Bodies:       {}", snapshot.bodies.len());
    for body in &snapshot.bodies {
        println!(
            "  body {:>3}  r={:.3}  m={:.4}  pos={:.4?}  vel={:.4?}  |omega|={:.4}",
            body.id.0,
            body.radius,
            body.mass,
            body.position.to_array(),
            body.velocity.to_array(),
            body.omega.length(),
        );
    }

    Ok(())
}

/// Validate a config or scene file.
pub fn validate(path: &Path) -> CliResult {
    println!("tumble validator");
    println!("────────────────");
    println!();

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            println!("Validating config: {}", path.display());
            let config = SimConfig::load(path)?;
            println!("✅ Config is valid (profile {}, tick {}s).", config.profile, config.tick);
        }
        Some("json") => {
            println!("Validating scene: {}", path.display());
            match SceneFile::load(path)?.build() {
                Ok(scene) => println!(
                    "✅ Scene is valid ({} objects, {} polygons, {} platforms).",
                    scene.object_count(),
                    scene.polygon_count(),
                    scene.platforms().len()
                ),
                Err(e) => println!("❌ Scene validation failed: {e}"),
            }
        }
        _ => println!("Unsupported file format. Use .toml (config) or .json (scene)."),
    }

    Ok(())
}
