//! Benchmark scenarios: procedural scene, bodies and config for each case.
//!
//! Four canonical scenarios for regression testing:
//! 1. **Drop**: a sphere falls onto a floor and bounces to rest
//! 2. **Roll**: a sphere rolls across a floor and up a ramp under input
//! 3. **Platform ride**: a sphere rests on a shuttling platform
//! 4. **Pinball**: two spheres collide inside a bumper-walled arena

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use tumble_material::{MaterialDatabase, SurfaceMaterial};
use tumble_scene::generators::{box_faces, floor_quad, ramp, wall_facing_neg_x};
use tumble_scene::StaticScene;
use tumble_solver::{BodyState, ControlInput, SimConfig};
use tumble_types::{BodyId, TumbleError, TumbleResult};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Drop,
    Roll,
    PlatformRide,
    /// Two bodies in one arena.
    Pinball,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::Drop,
            ScenarioKind::Roll,
            ScenarioKind::PlatformRide,
            ScenarioKind::Pinball,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Drop => "drop",
            ScenarioKind::Roll => "roll",
            ScenarioKind::PlatformRide => "platform_ride",
            ScenarioKind::Pinball => "pinball",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = TumbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                TumbleError::InvalidConfig(format!(
                    "unknown scenario '{s}', expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// One simulated body and the input it holds for the whole run.
#[derive(Debug, Clone)]
pub struct BodySetup {
    pub state: BodyState,
    pub input: ControlInput,
    /// Bounce restitution other bodies see in sphere impacts.
    pub bounce_restitution: f64,
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub config: SimConfig,
    pub scene: StaticScene,
    pub bodies: Vec<BodySetup>,
    /// Number of ticks to simulate.
    pub ticks: u32,
}

impl Scenario {
    fn body(config: &SimConfig, id: u32, position: DVec3) -> BodySetup {
        BodySetup {
            state: BodyState::new(BodyId(id), &config.body, position),
            input: ControlInput::idle(),
            bounce_restitution: config.body.bounce_restitution,
        }
    }

    /// A sphere dropped from 5 units onto a half-bouncy floor.
    pub fn drop_onto_floor() -> TumbleResult<Self> {
        let config = SimConfig::default();
        let mut scene = StaticScene::new();
        let concrete = scene.add_material(SurfaceMaterial::new("concrete", 1.0, 0.5))?;
        scene.add_object(false, Some(concrete), &[floor_quad(20.0, 0.0)])?;

        Ok(Self {
            kind: ScenarioKind::Drop,
            bodies: vec![Self::body(&config, 1, DVec3::new(0.0, 0.0, 5.0))],
            config,
            scene,
            ticks: 240,
        })
    }

    /// A sphere pushed along +X over a grippy floor and up a ramp.
    pub fn roll() -> TumbleResult<Self> {
        let config = SimConfig::default();
        let presets = MaterialDatabase::with_defaults();
        let mut scene = StaticScene::new();
        let grip = scene.add_material(presets.require("high_friction")?.clone())?;
        scene.add_object(false, Some(grip), &[floor_quad(40.0, 0.0)])?;
        let slope: Vec<DVec3> = ramp(10.0, 4.0, 2.0)
            .into_iter()
            .map(|p| p + DVec3::new(2.0, 0.0, 0.0))
            .collect();
        scene.add_object(true, Some(grip), &[slope])?;

        let mut body = Self::body(&config, 1, DVec3::new(0.0, 0.0, config.body.radius));
        body.input = ControlInput {
            move_x: 1.0,
            ..ControlInput::idle()
        };
        Ok(Self {
            kind: ScenarioKind::Roll,
            config,
            scene,
            bodies: vec![body],
            ticks: 150,
        })
    }

    /// A sphere riding a slab that carries it 10 units along +X.
    ///
    /// The body starts at the slab's speed so it never has to catch up
    /// through friction.
    pub fn platform_ride() -> TumbleResult<Self> {
        const SLAB_SPEED: f64 = 2.0;
        let config = SimConfig::default();
        let mut scene = StaticScene::new();
        scene.add_object(false, None, &[floor_quad(40.0, -3.0)])?;
        scene.add_platform(
            None,
            &box_faces(DVec3::new(-3.0, -2.0, -0.5), DVec3::new(3.0, 2.0, 0.0)),
            DVec3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
            SLAB_SPEED,
        )?;

        let mut rider = Self::body(&config, 1, DVec3::new(0.0, 0.0, config.body.radius));
        rider.state.velocity = DVec3::new(SLAB_SPEED, 0.0, 0.0);
        Ok(Self {
            kind: ScenarioKind::PlatformRide,
            bodies: vec![rider],
            config,
            scene,
            ticks: 150,
        })
    }

    /// Two spheres rolling head-on inside a square arena of bumpers.
    pub fn pinball() -> TumbleResult<Self> {
        let config = SimConfig::default();
        let presets = MaterialDatabase::with_defaults();
        let mut scene = StaticScene::new();
        scene.add_object(false, None, &[floor_quad(10.0, 0.0)])?;
        let bumper = scene.add_material(presets.require("bumper")?.clone())?;
        scene.add_object(true, Some(bumper), &arena_walls(5.0, 1.0))?;

        let r = config.body.radius;
        let mut left = Self::body(&config, 1, DVec3::new(-2.0, 0.0, r));
        left.state.velocity = DVec3::new(6.0, 0.0, 0.0);
        let mut right = Self::body(&config, 2, DVec3::new(2.0, 0.05, r));
        right.state.velocity = DVec3::new(-6.0, 0.0, 0.0);

        Ok(Self {
            kind: ScenarioKind::Pinball,
            config,
            scene,
            bodies: vec![left, right],
            ticks: 200,
        })
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> TumbleResult<Self> {
        match kind {
            ScenarioKind::Drop => Self::drop_onto_floor(),
            ScenarioKind::Roll => Self::roll(),
            ScenarioKind::PlatformRide => Self::platform_ride(),
            ScenarioKind::Pinball => Self::pinball(),
        }
    }

    /// Replaces the config of the scenario and of every body in it.
    pub fn with_config(mut self, config: SimConfig) -> Self {
        for body in &mut self.bodies {
            let fresh = BodyState::new(body.state.id, &config.body, body.state.position);
            body.state = BodyState {
                velocity: body.state.velocity,
                ..fresh
            };
            body.bounce_restitution = config.body.bounce_restitution;
        }
        self.config = config;
        self
    }
}

/// Four inward-facing walls around the square `[-half, half]²`.
fn arena_walls(half: f64, height: f64) -> Vec<Vec<DVec3>> {
    let east = wall_facing_neg_x(half, half, height);
    (0..4)
        .map(|quarter| {
            let turn = DQuat::from_rotation_z(quarter as f64 * FRAC_PI_2);
            east.iter().map(|&p| turn * p).collect()
        })
        .collect()
}
