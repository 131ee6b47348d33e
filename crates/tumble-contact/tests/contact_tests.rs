//! Integration tests for tumble-contact.

use glam::DVec3;
use tumble_contact::{
    find_contacts, first_platform_intersect, sweep, test_move, velocity_cancel, CancelFlags,
    CancelReport, Contact, ContactSource, QueryCache, ResponseContext, StepIntegrator, SweptSphere,
    TickOutcome, WorkingSet,
};
use tumble_material::SurfaceMaterial;
use tumble_math::Aabb;
use tumble_scene::generators::{box_faces, floor_quad, floor_triangles, wall_facing_neg_x};
use tumble_scene::{
    GeometrySource, MovingPlatform, ObjectKind, ObjectMask, QueryResult, RadialForce, SphereProxy,
    StaticScene,
};
use tumble_solver::{BodyState, ControlInput, Modifiers, PhysicsProfile, SimConfig};
use tumble_telemetry::{BounceStrength, EventKind};
use tumble_types::{constants, BodyId, ObjectId};

const RADIUS: f64 = 0.3;

fn config() -> SimConfig {
    let mut config = SimConfig::default();
    config.body.radius = RADIUS;
    config
}

fn floor_scene(friction: f64, restitution: f64) -> StaticScene {
    let mut scene = StaticScene::new();
    let floor = scene
        .add_material(SurfaceMaterial::new("floor", friction, restitution))
        .unwrap();
    scene.add_object(false, Some(floor), &[floor_quad(10.0, 0.0)]).unwrap();
    scene
}

fn body_at(config: &SimConfig, position: DVec3) -> BodyState {
    BodyState::new(BodyId(1), &config.body, position)
}

fn bounce_speed(outcome: &TickOutcome) -> Option<f64> {
    outcome.events.iter().find_map(|e| match e.kind {
        EventKind::Bounce { speed, .. } => Some(speed),
        _ => None,
    })
}

fn count_events(outcome: &TickOutcome, name: &str) -> usize {
    outcome.events.iter().filter(|e| e.kind_name() == name).count()
}

/// A contact against still geometry below or beside a body at `center`.
fn still_contact(center: DVec3, normal: DVec3, restitution: f64, friction: f64) -> Contact {
    Contact {
        source: ContactSource::Static {
            object: ObjectId(0),
            shape: false,
        },
        position: center - normal * RADIUS,
        normal,
        surface_velocity: DVec3::ZERO,
        friction,
        restitution,
        force: 0.0,
        material: None,
        distance: RADIUS,
        normal_force: 0.0,
    }
}

/// Floor plus two walls exactly one diameter apart around the origin.
fn slot_scene() -> StaticScene {
    let mut scene = StaticScene::new();
    let slick = scene
        .add_material(SurfaceMaterial::new("slick", 0.0, 1.0))
        .unwrap();
    scene.add_object(false, None, &[floor_quad(10.0, 0.0)]).unwrap();
    let mut left = wall_facing_neg_x(-RADIUS, 5.0, 2.0);
    left.reverse();
    scene
        .add_object(false, Some(slick), &[left, wall_facing_neg_x(RADIUS, 5.0, 2.0)])
        .unwrap();
    scene
}

/// Distance from `point` to the nearest point of the box `[min, max]`.
fn box_distance(point: DVec3, min: DVec3, max: DVec3) -> f64 {
    (point - point.clamp(min, max)).length()
}

fn roof() -> QueryResult {
    let right = vec![
        DVec3::new(0.0, -1.0, 1.0),
        DVec3::new(1.0, -1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(0.0, 1.0, 1.0),
    ];
    let left = vec![
        DVec3::new(-1.0, -1.0, 0.0),
        DVec3::new(0.0, -1.0, 1.0),
        DVec3::new(0.0, 1.0, 1.0),
        DVec3::new(-1.0, 1.0, 0.0),
    ];
    let mut result = QueryResult::default();
    for face in [right, left] {
        result
            .soup
            .add_polygon(ObjectId(0), ObjectKind::Interior, None, &face)
            .unwrap();
    }
    result
}

fn reversed(result: &QueryResult) -> QueryResult {
    let mut out = QueryResult::default();
    for poly in result.soup.polys.iter().rev() {
        let vertices: Vec<DVec3> = result.soup.poly_vertices(poly).collect();
        out.soup
            .add_polygon(poly.object, poly.kind, poly.material, &vertices)
            .unwrap();
    }
    out
}

// ─── Swept Solver Tests ───────────────────────────────────────

#[test]
fn sweep_stops_on_face_at_one_radius() {
    let scene = floor_scene(1.0, 1.0);
    let mut candidates = QueryResult::default();
    scene.query(
        &Aabb::new(DVec3::splat(-10.0), DVec3::splat(10.0)),
        ObjectMask::COLLISION,
        false,
        None,
        &mut candidates,
    );
    let sphere = SweptSphere {
        position: DVec3::new(0.5, 0.5, 2.0),
        velocity: DVec3::new(0.0, 0.0, -10.0),
        radius: RADIUS,
        budget: 1.0,
    };
    let outcome = sweep(&candidates, &scene, &sphere, false);
    let impact = outcome.impact.expect("face impact");
    assert!((outcome.time - 0.17).abs() < 1e-12);
    assert!((outcome.position.z - RADIUS).abs() < 1e-12);
    assert!((impact.normal - DVec3::Z).length() < 1e-12);
    assert!((impact.position - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
    assert!((impact.coefficients.restitution - 1.0).abs() < 1e-12);
}

#[test]
fn sweep_without_impact_uses_whole_budget() {
    let scene = floor_scene(1.0, 1.0);
    let sphere = SweptSphere {
        position: DVec3::new(0.0, 0.0, 2.0),
        velocity: DVec3::new(3.0, 0.0, 0.0),
        radius: RADIUS,
        budget: 0.5,
    };
    let mut cache = QueryCache::new();
    let outcome = test_move(&mut cache, &scene, &sphere, ObjectMask::COLLISION, false, None, false);
    assert!(!outcome.hit());
    assert_eq!(outcome.time, 0.5);
    assert!((outcome.position - DVec3::new(1.5, 0.0, 2.0)).length() < 1e-12);
}

#[test]
fn zero_velocity_sweep_is_noop() {
    let scene = floor_scene(1.0, 1.0);
    let sphere = SweptSphere {
        position: DVec3::new(0.0, 0.0, RADIUS),
        velocity: DVec3::new(0.0, 0.0, -0.0005),
        radius: RADIUS,
        budget: 0.008,
    };
    let mut cache = QueryCache::new();
    let outcome = test_move(&mut cache, &scene, &sphere, ObjectMask::COLLISION, false, None, false);
    assert!(!outcome.hit());
    assert_eq!(outcome.position, sphere.position);
    assert_eq!(outcome.time, sphere.budget);
    assert_eq!(cache.refreshes(), 0);
}

#[test]
fn sweep_hits_ridge_edge() {
    let candidates = roof();
    let scene = StaticScene::new();
    let sphere = SweptSphere {
        position: DVec3::new(0.0, 0.0, 3.0),
        velocity: DVec3::new(0.0, 0.0, -1.0),
        radius: 0.5,
        budget: 5.0,
    };
    let outcome = sweep(&candidates, &scene, &sphere, false);
    let impact = outcome.impact.expect("edge impact");
    assert!((outcome.time - 1.5).abs() < 1e-9);
    assert!((impact.position - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-9);
    assert!((impact.normal - DVec3::Z).length() < 1e-9);
}

#[test]
fn edge_impact_is_order_independent() {
    let forward = roof();
    let backward = reversed(&forward);
    let scene = StaticScene::new();
    let sphere = SweptSphere {
        position: DVec3::new(0.0, 0.2, 3.0),
        velocity: DVec3::new(0.0, 0.0, -1.0),
        radius: 0.5,
        budget: 5.0,
    };
    let a = sweep(&forward, &scene, &sphere, false);
    let b = sweep(&backward, &scene, &sphere, false);
    assert_eq!(a.time, b.time);
    let (na, nb) = (a.impact.unwrap().normal, b.impact.unwrap().normal);
    assert!((na - nb).length() < 1e-12);
}

#[test]
fn sweep_hits_corner() {
    // Upright triangle facing +X with its apex at the origin; the sphere
    // passes just above the apex.
    let mut candidates = QueryResult::default();
    candidates
        .soup
        .add_polygon(
            ObjectId(0),
            ObjectKind::Interior,
            None,
            &[
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(0.0, -1.0, -1.0),
                DVec3::new(0.0, 1.0, -1.0),
            ],
        )
        .unwrap();
    let scene = StaticScene::new();
    let sphere = SweptSphere {
        position: DVec3::new(2.0, 0.0, 0.3),
        velocity: DVec3::new(-1.0, 0.0, 0.0),
        radius: 0.5,
        budget: 5.0,
    };
    let outcome = sweep(&candidates, &scene, &sphere, false);
    let impact = outcome.impact.expect("corner impact");
    assert!((outcome.time - 1.6).abs() < 1e-9);
    assert!(impact.position.length() < 1e-12);
    assert!((impact.normal - DVec3::new(0.8, 0.0, 0.6)).length() < 1e-9);
}

#[test]
fn sphere_impact_wins_over_simultaneous_face() {
    let mut candidates = QueryResult::default();
    candidates
        .soup
        .add_polygon(ObjectId(0), ObjectKind::Interior, None, &floor_quad(10.0, 0.0))
        .unwrap();
    // A sphere just under the floor, touched at the same instant as the face.
    candidates.spheres.push(SphereProxy {
        id: BodyId(7),
        position: DVec3::new(0.0, 0.0, -0.5),
        velocity: DVec3::ZERO,
        radius: 0.5,
        mass: 1.0,
        bounce_restitution: 0.5,
    });
    let scene = StaticScene::new();
    let sphere = SweptSphere {
        position: DVec3::new(0.0, 0.0, 2.0),
        velocity: DVec3::new(0.0, 0.0, -1.0),
        radius: 0.5,
        budget: 5.0,
    };
    let outcome = sweep(&candidates, &scene, &sphere, true);
    let impact = outcome.impact.expect("impact");
    assert!((outcome.time - 1.5).abs() < 1e-9);
    assert!(matches!(impact.source, ContactSource::Body { id: BodyId(7), .. }));
}

#[test]
fn consumed_time_stays_within_budget() {
    let mut scene = floor_scene(1.0, 1.0);
    scene
        .add_object(false, None, &box_faces(DVec3::new(1.0, -1.0, 0.0), DVec3::new(2.0, 1.0, 1.0)))
        .unwrap();
    let mut cache = QueryCache::new();
    for i in 0..40 {
        let angle = i as f64 * 0.157;
        let sphere = SweptSphere {
            position: DVec3::new(0.0, 0.0, 0.5),
            velocity: DVec3::new(angle.cos() * 30.0, angle.sin() * 30.0, -5.0),
            radius: RADIUS,
            budget: 0.008 * (1 + i % 4) as f64,
        };
        let outcome = test_move(&mut cache, &scene, &sphere, ObjectMask::COLLISION, false, None, false);
        assert!(outcome.time >= 0.0);
        assert!(outcome.time <= sphere.budget);
    }
}

// ─── Manifold Tests ───────────────────────────────────────────

#[test]
fn resting_across_shared_diagonal_gives_two_contacts() {
    let mut scene = StaticScene::new();
    scene.add_object(false, None, &floor_triangles(4.0, 0.0)).unwrap();
    let position = DVec3::new(0.5, 0.5, RADIUS);
    let mut candidates = QueryResult::default();
    scene.query(
        &Aabb::around_sphere(position, 1.0),
        ObjectMask::COLLISION,
        true,
        None,
        &mut candidates,
    );
    let mut contacts = Vec::new();
    let mut events = Vec::new();
    find_contacts(&candidates, &scene, position, RADIUS, DVec3::ZERO, false, &mut contacts, &mut events);
    assert_eq!(contacts.len(), 2);
    for contact in &contacts {
        assert!((contact.normal - DVec3::Z).length() < 1e-12);
        assert!((contact.distance - RADIUS).abs() < 1e-12);
    }
    assert!(events.is_empty());
}

#[test]
fn manifold_snaps_to_edge_and_rejects_far_polygons() {
    let mut scene = StaticScene::new();
    scene.add_object(false, None, &[floor_quad(2.0, 0.0)]).unwrap();
    let mut candidates = QueryResult::default();
    scene.query(
        &Aabb::new(DVec3::splat(-5.0), DVec3::splat(5.0)),
        ObjectMask::COLLISION,
        true,
        None,
        &mut candidates,
    );
    let mut contacts = Vec::new();
    let mut events = Vec::new();

    // Over the edge: the nearest point is on the edge, normal tilts outward.
    let position = DVec3::new(1.1, 0.0, 0.2);
    find_contacts(&candidates, &scene, position, RADIUS, DVec3::ZERO, false, &mut contacts, &mut events);
    assert_eq!(contacts.len(), 1);
    assert!((contacts[0].position - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
    assert!(contacts[0].normal.x > 0.0 && contacts[0].normal.z > 0.0);

    // Beyond reach of the edge.
    let position = DVec3::new(1.5, 0.0, 0.1);
    find_contacts(&candidates, &scene, position, RADIUS, DVec3::ZERO, false, &mut contacts, &mut events);
    assert!(contacts.is_empty());
}

#[test]
fn shape_collisions_notify_once_per_material() {
    let mut scene = StaticScene::new();
    scene.add_object(true, None, &floor_triangles(4.0, 0.0)).unwrap();
    let position = DVec3::new(0.5, 0.5, RADIUS);
    let mut candidates = QueryResult::default();
    scene.query(
        &Aabb::around_sphere(position, 1.0),
        ObjectMask::COLLISION,
        true,
        None,
        &mut candidates,
    );
    let mut contacts = Vec::new();
    let mut events = Vec::new();
    find_contacts(&candidates, &scene, position, RADIUS, DVec3::ZERO, false, &mut contacts, &mut events);
    assert_eq!(contacts.len(), 2);
    let notifications = events
        .iter()
        .filter(|e| matches!(e, EventKind::SurfaceCollision { .. }))
        .count();
    assert_eq!(notifications, 1);
}

// ─── Query Cache Tests ────────────────────────────────────────

#[test]
fn cache_reuses_containing_box() {
    let scene = floor_scene(1.0, 1.0);
    let mut cache = QueryCache::new();
    let outer = Aabb::around_sphere(DVec3::new(0.0, 0.0, 0.3), 1.0);
    let inner = Aabb::around_sphere(DVec3::new(0.1, 0.0, 0.3), 0.3);

    cache.fetch(&scene, &outer, ObjectMask::COLLISION, true, None, false);
    cache.fetch(&scene, &inner, ObjectMask::COLLISION, true, None, false);
    assert_eq!(cache.refreshes(), 1);

    cache.fetch(&scene, &inner, ObjectMask::INTERIOR, true, None, false);
    assert_eq!(cache.refreshes(), 2);

    cache.fetch(&scene, &inner, ObjectMask::INTERIOR, true, None, true);
    assert_eq!(cache.refreshes(), 3);

    cache.invalidate();
    cache.fetch(&scene, &inner, ObjectMask::INTERIOR, true, None, false);
    assert_eq!(cache.refreshes(), 4);
    assert_eq!(cache.result().soup.len(), 1);
}

// ─── Step Integrator Tests ────────────────────────────────────

#[test]
fn drop_rebounds_with_restitution() {
    let mut config = config();
    config.modifiers.bounce = Some(1.0);
    let mut scene = floor_scene(0.0, 0.6);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 5.0));
    let input = ControlInput::idle();

    let mut impact = None;
    for _ in 0..100 {
        let outcome = integrator.advance(&mut body, &input, &mut scene);
        if let Some(speed) = bounce_speed(&outcome) {
            impact = Some(speed);
            break;
        }
    }
    let impact = impact.expect("the body should land within 100 ticks");
    let expected = (2.0 * 20.0 * 4.7_f64).sqrt();
    assert!((impact - expected).abs() / expected < 0.01, "impact speed {impact}");

    // Rebound speed at contact height, recovered from the tick's end state.
    assert!(body.velocity.z > 0.0);
    let rebound = (body.velocity.z.powi(2) + 2.0 * 20.0 * (body.position.z - RADIUS)).sqrt();
    assert!((rebound - 0.6 * impact).abs() / (0.6 * impact) < 0.01, "rebound speed {rebound}");

    let last = integrator.last_contact().expect("swept impact recorded");
    assert!((last.normal - DVec3::Z).length() < 1e-9);
}

#[test]
fn repeated_bounces_lose_height() {
    let mut config = config();
    config.modifiers.bounce = Some(1.0);
    let mut scene = floor_scene(0.0, 0.6);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 3.0));
    let input = ControlInput::idle();

    let mut peaks = Vec::new();
    let mut rising = false;
    let mut last_z = body.position.z;
    for _ in 0..400 {
        integrator.advance(&mut body, &input, &mut scene);
        let z = body.position.z;
        if rising && z < last_z {
            peaks.push(last_z);
        }
        rising = z > last_z;
        last_z = z;
        assert!(z >= RADIUS - 1e-6, "sank below the floor: {z}");
    }
    assert!(peaks.len() >= 2);
    for pair in peaks.windows(2) {
        assert!(pair[1] < pair[0]);
    }
}

#[test]
fn resting_body_stays_at_rest() {
    for profile in PhysicsProfile::ALL {
        let mut config = config();
        config.profile = profile;
        let mut scene = floor_scene(1.0, 0.5);
        let mut integrator = StepIntegrator::new(config.clone()).unwrap();
        let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS));
        let input = ControlInput::idle();

        for _ in 0..20 {
            let outcome = integrator.advance(&mut body, &input, &mut scene);
            assert!(bounce_speed(&outcome).is_none(), "{profile} micro-bounced");
        }
        assert!(body.velocity.length() < 1e-6, "{profile}: {:?}", body.velocity);
        assert!((body.position.z - RADIUS).abs() < 1e-6, "{profile}: {:?}", body.position);
        assert_eq!(integrator.contacts().len(), 1);
    }
}

#[test]
fn body_never_passes_through_wall() {
    let mut config = config();
    config.modifiers.bounce = Some(1.0);
    let mut scene = floor_scene(1.0, 0.5);
    scene.add_object(false, None, &[wall_facing_neg_x(2.0, 5.0, 2.0)]).unwrap();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS)).with_velocity(DVec3::new(20.0, 0.0, 0.0));
    let input = ControlInput::idle();

    let mut bounced = false;
    for _ in 0..30 {
        let outcome = integrator.advance(&mut body, &input, &mut scene);
        bounced |= bounce_speed(&outcome).is_some();
        assert!(body.position.x <= 2.0 - RADIUS + 1e-6, "through the wall: {:?}", body.position);
        assert!(body.position.z >= RADIUS - 1e-6, "through the floor: {:?}", body.position);
    }
    assert!(bounced);
    assert!(body.velocity.x < 0.0);
}

#[test]
fn query_cache_does_not_change_trajectory() {
    let run = |cached: bool| {
        let config = config();
        let mut scene = floor_scene(1.0, 0.5);
        scene.add_object(false, None, &[wall_facing_neg_x(2.0, 5.0, 2.0)]).unwrap();
        let mut integrator = StepIntegrator::new(config.clone()).unwrap().with_query_cache(cached);
        let mut body = body_at(&config, DVec3::new(0.0, 0.0, 1.5)).with_velocity(DVec3::new(6.0, 1.0, 0.0));
        let input = ControlInput::forward(0.5);
        let mut queries = 0;
        for _ in 0..40 {
            integrator.advance(&mut body, &input, &mut scene);
            queries += integrator.take_query_count();
        }
        (body, queries)
    };
    let (with_cache, cached_queries) = run(true);
    let (without_cache, uncached_queries) = run(false);
    assert!((with_cache.position - without_cache.position).length() < 1e-12);
    assert!((with_cache.velocity - without_cache.velocity).length() < 1e-12);
    assert!((with_cache.omega - without_cache.omega).length() < 1e-12);
    assert!(cached_queries < uncached_queries);
}

#[test]
fn forward_input_rolls_body() {
    let config = config();
    let mut scene = floor_scene(1.0, 0.5);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS));
    let input = ControlInput::forward(1.0);

    for _ in 0..30 {
        integrator.advance(&mut body, &input, &mut scene);
    }
    assert!(body.velocity.y > 1.0, "{:?}", body.velocity);
    assert!(body.velocity.x.abs() < 1e-6);
    // Rolling toward +Y spins about -X.
    assert!(body.omega.x < 0.0);
    assert!(integrator.best_contact().is_some());
}

#[test]
fn jump_leaves_the_floor() {
    let config = config();
    let mut scene = floor_scene(1.0, 0.5);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS));

    integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    let input = ControlInput {
        jump: true,
        ..ControlInput::idle()
    };
    let outcome = integrator.advance(&mut body, &input, &mut scene);
    let jumps = outcome
        .events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Jump { .. }))
        .count();
    assert_eq!(jumps, 1);
    assert!(body.velocity.z > 0.0);
    assert!(body.position.z > RADIUS);
}

#[test]
fn disabled_movement_only_drags() {
    let config = config();
    let mut scene = StaticScene::new();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 5.0)).with_velocity(DVec3::new(5.0, 0.0, 0.0));
    body.mode.movement_enabled = false;

    integrator.advance(&mut body, &ControlInput::forward(1.0), &mut scene);
    assert!(body.velocity.x > 0.0 && body.velocity.x < 5.0);
    assert_eq!(body.velocity.z, 0.0);
}

#[test]
fn axis_restriction_freezes_body() {
    let config = config();
    let mut scene = floor_scene(1.0, 0.5);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let start = DVec3::new(0.0, 0.0, 2.0);
    let mut body = body_at(&config, start).with_velocity(DVec3::new(3.0, 0.0, 0.0));
    body.mode.axis_restricted = true;

    integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    assert_eq!(body.velocity, DVec3::ZERO);
    assert_eq!(body.position, start);
}

#[test]
fn tick_reports_time_and_interpolation_delta() {
    let config = config();
    let mut scene = floor_scene(1.0, 0.5);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 3.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    assert!(!outcome.truncated());
    assert!((outcome.consumed - config.tick).abs() < 1e-12);
    assert_eq!(outcome.substeps, 4);
    assert!((outcome.delta - (body.prev_position - body.position)).length() < 1e-12);
    assert_eq!(outcome.events.first().map(|e| e.kind_name()), Some("tick_begin"));
    assert_eq!(outcome.events.last().map(|e| e.kind_name()), Some("tick_end"));
    assert_eq!(integrator.ticks(), 1);
}

#[test]
fn hard_landing_is_classified() {
    let mut config = config();
    config.modifiers.bounce = Some(1.0);
    let mut scene = floor_scene(0.0, 0.5);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 1.0)).with_velocity(DVec3::new(0.0, 0.0, -40.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    let strength = outcome.events.iter().find_map(|e| match e.kind {
        EventKind::Bounce { strength, .. } => Some(strength),
        _ => None,
    });
    assert_eq!(strength, Some(BounceStrength::Hard));
}

#[test]
fn no_profile_tunnels_into_a_box() {
    let (min, max) = (DVec3::new(-0.5, -0.5, 0.0), DVec3::new(0.5, 0.5, 1.0));
    for profile in PhysicsProfile::ALL {
        for shot in 0..12 {
            let mut config = config();
            config.profile = profile;
            let mut scene = floor_scene(1.0, 0.5);
            scene.add_object(false, None, &box_faces(min, max)).unwrap();
            let mut integrator = StepIntegrator::new(config.clone()).unwrap();
            let angle = shot as f64 * std::f64::consts::TAU / 12.0 + 0.1;
            let aim = DVec3::new(angle.cos(), angle.sin(), 0.0);
            let mut body = body_at(&config, aim * 3.0 + DVec3::new(0.0, 0.0, RADIUS)).with_velocity(-aim * 30.0);

            for _ in 0..8 {
                integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
                let gap = box_distance(body.position, min, max);
                assert!(gap >= RADIUS - 1e-3, "{profile} shot {shot}: {gap} at {:?}", body.position);
            }
        }
    }
}

#[test]
fn first_impact_is_sampled_for_interpolation() {
    let config = config();
    let mut scene = floor_scene(0.0, 0.5);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 1.0)).with_velocity(DVec3::new(0.0, 0.0, -40.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    let sample = outcome.first_impact.expect("mid-tick impact");
    // Two full sub-steps, then a short one to the floor.
    assert!((sample.position.z - RADIUS).abs() < 1e-9, "{:?}", sample.position);
    assert!(sample.fraction > 0.5 && sample.fraction < 0.6, "fraction {}", sample.fraction);

    // Free flight never produces a sample.
    let mut falling = body_at(&config, DVec3::new(0.0, 0.0, 5.0));
    let outcome = integrator.advance(&mut falling, &ControlInput::idle(), &mut scene);
    assert!(outcome.first_impact.is_none());
}

#[test]
fn wedged_body_hits_the_pass_cap() {
    let mut config = config();
    config.modifiers.bounce = Some(1.0);
    let mut scene = slot_scene();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS)).with_velocity(DVec3::new(5.0, 0.0, 0.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    let capped = outcome.events.iter().find_map(|e| match e.kind {
        EventKind::ContactPassCapReached { passes } => Some(passes),
        _ => None,
    });
    assert_eq!(capped, Some(constants::CANCEL_PASS_CAP));
    assert_eq!(outcome.max_cancel_passes, constants::CANCEL_PASS_CAP);
    assert_eq!(count_events(&outcome, "contact_pass_cap"), 1);
    assert!(body.position.x.abs() < 1e-9, "{:?}", body.position);
    assert!((body.position.z - RADIUS).abs() < 1e-9);
    assert_eq!(integrator.contacts().len(), 3);
}

// ─── Sub-step Termination Tests ───────────────────────────────

fn short_substep_config(profile: PhysicsProfile) -> SimConfig {
    let mut config = config();
    config.profile = profile;
    config.body.max_substep = 0.002;
    config
}

#[test]
fn iteration_capped_profile_truncates_tick() {
    let config = short_substep_config(PhysicsProfile::Mbu);
    let mut scene = StaticScene::new();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 5.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    assert_eq!(outcome.substeps, constants::PROFILE_ITERATION_CAP);
    assert!(outcome.truncated());
    assert!((outcome.remaining - 0.010).abs() < 1e-12, "remaining {}", outcome.remaining);
    let reported = outcome.events.iter().find_map(|e| match e.kind {
        EventKind::SubstepCapReached { remaining } => Some(remaining),
        _ => None,
    });
    assert_eq!(reported, Some(outcome.remaining));
}

#[test]
fn time_exhausted_profile_runs_whole_tick() {
    let config = short_substep_config(PhysicsProfile::Mbg);
    let mut scene = StaticScene::new();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 5.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    assert!(outcome.substeps >= 16);
    assert!(!outcome.truncated());
    assert!((outcome.consumed - config.tick).abs() < 1e-12);
    assert_eq!(count_events(&outcome, "substep_cap"), 0);
}

#[test]
fn safety_cap_applies_to_every_profile() {
    let mut config = short_substep_config(PhysicsProfile::Mbg);
    config.body.substep_cap = 8;
    let mut scene = StaticScene::new();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 5.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    assert_eq!(outcome.substeps, 8);
    assert!((outcome.remaining - 0.016).abs() < 1e-12, "remaining {}", outcome.remaining);
    assert_eq!(count_events(&outcome, "substep_cap"), 1);
}

// ─── Contact Response Tests ───────────────────────────────────

fn cancel_once(
    profile: PhysicsProfile,
    body: &mut BodyState,
    contacts: &mut [Contact],
    modifiers: &Modifiers,
) -> (CancelReport, Vec<EventKind>) {
    let config = config();
    let tuning = profile.tuning();
    let ctx = ResponseContext {
        config: &config.body,
        tuning: &tuning,
        modifiers,
    };
    let mut scene = StaticScene::new();
    let mut flags = CancelFlags::default();
    let mut events = Vec::new();
    let report = velocity_cancel(body, contacts, &ctx, false, false, &mut flags, &[], &mut scene, &mut events);
    (report, events)
}

#[test]
fn shallow_hit_slides_on_still_ground() {
    let config = config();
    let start = DVec3::new(0.0, 0.0, RADIUS);
    let mut body = body_at(&config, start).with_velocity(DVec3::new(10.0, 0.0, -0.5));
    let speed = body.velocity.length();
    let mut contacts = [still_contact(start, DVec3::Z, 0.5, 1.0)];

    let (report, _) = cancel_once(PhysicsProfile::Mbu, &mut body, &mut contacts, &Modifiers::default());
    assert_eq!(report.corrections, 1);
    assert!(body.velocity.z.abs() < 1e-12);
    assert!((body.velocity.length() - speed).abs() < 1e-12);
    assert_eq!(body.omega, DVec3::ZERO);
}

#[test]
fn shallow_hit_bounces_when_slides_need_moving_ground() {
    let config = config();
    let start = DVec3::new(0.0, 0.0, RADIUS);
    let mut body = body_at(&config, start).with_velocity(DVec3::new(10.0, 0.0, -0.5));
    let mut contacts = [still_contact(start, DVec3::Z, 0.5, 1.0)];

    let (report, _) = cancel_once(PhysicsProfile::Xna, &mut body, &mut contacts, &Modifiers::default());
    assert_eq!(report.corrections, 1);
    // Restitution 0.5 · 0.9 on a 0.5 closing speed.
    assert!((body.velocity.z - 0.225).abs() < 1e-9, "{:?}", body.velocity);
    // Part of the slip turns into forward spin.
    assert!(body.velocity.x < 10.0);
    assert!(body.omega.y > 0.0);
}

#[test]
fn residual_penetration_is_pushed_out() {
    let config = config();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 0.2));
    let mut contact = still_contact(DVec3::new(0.0, 0.0, RADIUS), DVec3::Z, 0.5, 1.0);
    contact.distance = 0.2;
    let mut contacts = [contact];

    let (report, _) = cancel_once(PhysicsProfile::Mbu, &mut body, &mut contacts, &Modifiers::default());
    assert!((report.push_out - 0.1).abs() < 1e-12);
    assert!((body.position.z - RADIUS).abs() < 1e-12);
    assert!((contacts[0].distance - RADIUS).abs() < 1e-12);

    // Distances were updated, so a second call does not push again.
    let (again, _) = cancel_once(PhysicsProfile::Mbu, &mut body, &mut contacts, &Modifiers::default());
    assert!(again.push_out < 1e-12);
}

#[test]
fn push_out_is_clamped_to_one_radius() {
    let config = config();
    let mut body = body_at(&config, DVec3::ZERO);
    let mut contact = still_contact(DVec3::new(0.0, 0.0, RADIUS), DVec3::Z, 0.5, 1.0);
    contact.distance = -1.0;
    let mut contacts = [contact];

    let (report, _) = cancel_once(PhysicsProfile::Mbu, &mut body, &mut contacts, &Modifiers::default());
    assert!((report.push_out - RADIUS).abs() < 1e-12);
    assert!((body.position.z - RADIUS).abs() < 1e-12);
}

// ─── Sphere-Sphere Tests ──────────────────────────────────────

#[test]
fn head_on_spheres_swap_velocities() {
    let mut config = config();
    config.body.gravity = 0.0;
    config.body.bounce_restitution = 1.0;
    let mut scene = StaticScene::new();
    let mut a = BodyState::new(BodyId(1), &config.body, DVec3::new(-RADIUS, 0.0, 5.0))
        .with_velocity(DVec3::new(1.0, 0.0, 0.0));
    let mut b = BodyState::new(BodyId(2), &config.body, DVec3::new(RADIUS, 0.0, 5.0))
        .with_velocity(DVec3::new(-1.0, 0.0, 0.0));
    let proxy = |body: &BodyState| SphereProxy {
        id: body.id,
        position: body.position,
        velocity: body.velocity,
        radius: body.radius,
        mass: body.mass,
        bounce_restitution: 1.0,
    };
    scene.upsert_sphere(proxy(&a));
    scene.upsert_sphere(proxy(&b));

    let mut ia = StepIntegrator::new(config.clone()).unwrap();
    let mut ib = StepIntegrator::new(config.clone()).unwrap();
    let momentum_before = a.velocity * a.mass + b.velocity * b.mass;
    let energy_before = a.kinetic_energy() + b.kinetic_energy();

    let outcome = ia.advance(&mut a, &ControlInput::idle(), &mut scene);
    assert!(outcome
        .events
        .iter()
        .any(|e| matches!(e.kind, EventKind::BodyCollision { other: 2, .. })));
    scene.upsert_sphere(proxy(&a));
    b.velocity = scene.sphere(BodyId(2)).unwrap().velocity;
    ib.advance(&mut b, &ControlInput::idle(), &mut scene);

    assert!((a.velocity - DVec3::new(-1.0, 0.0, 0.0)).length() < 1e-9, "{:?}", a.velocity);
    assert!((b.velocity - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-9, "{:?}", b.velocity);
    let momentum_after = a.velocity * a.mass + b.velocity * b.mass;
    assert!((momentum_after - momentum_before).length() < 1e-9);
    assert!((a.kinetic_energy() + b.kinetic_energy() - energy_before).abs() < 1e-9);
}

// ─── Moving Platform Tests ────────────────────────────────────

fn platform_scene(speed: f64) -> StaticScene {
    let mut scene = StaticScene::new();
    scene
        .add_platform(
            None,
            &box_faces(DVec3::new(-2.0, -2.0, -1.0), DVec3::new(2.0, 2.0, 0.0)),
            DVec3::ZERO,
            DVec3::new(100.0, 0.0, 0.0),
            speed,
        )
        .unwrap();
    scene
}

#[test]
fn body_rides_platform_without_corrections() {
    let config = config();
    let mut scene = platform_scene(1.0);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS)).with_velocity(DVec3::new(1.0, 0.0, 0.0));

    for _ in 0..10 {
        let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
        scene.advance_platforms(config.tick);
        assert!(bounce_speed(&outcome).is_none());
        assert_eq!(outcome.max_cancel_passes, 1);
        assert!(matches!(
            integrator.contacts().first().map(|c| c.source),
            Some(ContactSource::Platform { .. })
        ));
    }
    let platform_x = scene.platforms()[0].position().x;
    assert!((body.velocity - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    assert!((body.position.x - platform_x).abs() < 1e-6);
    assert!((body.position.z - RADIUS).abs() < 1e-6);
}

#[test]
fn tick_restores_platform_state() {
    let config = config();
    let mut scene = platform_scene(2.0);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 1.0));
    let before = scene.platforms()[0].position();

    integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    let platform = &scene.platforms()[0];
    assert_eq!(platform.position(), before);
    assert_eq!(platform.velocity(), DVec3::ZERO);
    assert!(scene.platform(platform.id()).is_some());
}

#[test]
fn resting_manifold_on_platform_carries_its_velocity() {
    let config = config();
    let mut scene = platform_scene(1.0);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS));
    let platform = scene.platform_mut(scene.platform_ids()[0]).unwrap();
    platform.push_tick_state();
    platform.compute_next_path_step(config.tick);

    let contacts = integrator.refresh_contacts(&body, &scene).to_vec();
    assert_eq!(contacts.len(), 1);
    assert!((contacts[0].surface_velocity - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-9);
}

#[test]
fn platform_precheck_shortens_substep() {
    let config = config();
    let mut scene = platform_scene(1.0);
    let mut working_set = WorkingSet::new();
    working_set.gather(&mut scene, &Aabb::new(DVec3::splat(-5.0), DVec3::splat(5.0)), config.tick);
    assert_eq!(working_set.len(), 1);

    let position = DVec3::new(0.0, 0.0, 1.0);
    let velocity = DVec3::new(0.0, 0.0, -100.0);
    let mut scratch = QueryResult::default();
    let mut budget = 0.008;
    first_platform_intersect(&working_set, &scene, position, velocity, RADIUS, &[], &mut budget, &mut scratch);
    assert!((budget - 0.007).abs() < 1e-12, "budget {budget}");

    // Already touching the platform: no shortening.
    let platform = &scene.platforms()[0];
    let touching = Contact {
        source: ContactSource::Platform {
            object: platform.object(),
            platform: platform.id(),
        },
        ..still_contact(position, DVec3::Z, 1.0, 1.0)
    };
    let mut budget = 0.008;
    first_platform_intersect(
        &working_set,
        &scene,
        position,
        velocity,
        RADIUS,
        &[touching],
        &mut budget,
        &mut scratch,
    );
    assert_eq!(budget, 0.008);
    working_set.release(&mut scene);
}

#[test]
fn fast_drop_is_stopped_by_platform() {
    let config = config();
    let mut scene = platform_scene(1.0);
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, 1.0)).with_velocity(DVec3::new(0.0, 0.0, -40.0));

    let outcome = integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    scene.advance_platforms(config.tick);
    let sample = outcome.first_impact.expect("stopped at the platform");
    assert!((sample.position.z - RADIUS).abs() < 1e-9, "{:?}", sample.position);
    assert!(bounce_speed(&outcome).is_some());
    for _ in 0..10 {
        integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
        scene.advance_platforms(config.tick);
        assert!(body.position.z >= RADIUS - 1e-6, "{:?}", body.position);
    }
}

#[test]
fn wedged_body_stops_platforms_for_the_tick() {
    let config = config();
    let modifiers = Modifiers {
        bounce: Some(1.0),
        ..Modifiers::default()
    };
    let tuning = PhysicsProfile::Mbu.tuning();
    let ctx = ResponseContext {
        config: &config.body,
        tuning: &tuning,
        modifiers: &modifiers,
    };
    let mut scene = platform_scene(1.0);
    let mut working_set = WorkingSet::new();
    let center = DVec3::new(0.0, 0.0, RADIUS);
    working_set.gather(&mut scene, &Aabb::around_sphere(center, 1.0), config.tick);

    let mut body = body_at(&config, center).with_velocity(DVec3::new(5.0, 0.0, 0.0));
    let mut contacts = [
        still_contact(center, DVec3::X, 1.0, 0.0),
        still_contact(center, DVec3::NEG_X, 1.0, 0.0),
    ];
    let mut flags = CancelFlags::default();
    let mut events = Vec::new();
    let report = velocity_cancel(
        &mut body,
        &mut contacts,
        &ctx,
        false,
        false,
        &mut flags,
        working_set.ids(),
        &mut scene,
        &mut events,
    );

    assert!(report.capped);
    assert_eq!(report.passes, constants::CANCEL_PASS_CAP);
    assert!(flags.stopped_paths);
    assert!(events
        .iter()
        .any(|e| matches!(e, EventKind::ContactPassCapReached { .. })));

    // Stopped at tick time zero: later syncs leave it in place.
    working_set.sync(&mut scene, 0.016);
    assert_eq!(scene.platforms()[0].position(), DVec3::ZERO);
    working_set.release(&mut scene);

    // The stop lasts only for the tick it was requested in.
    working_set.gather(&mut scene, &Aabb::around_sphere(center, 1.0), config.tick);
    working_set.sync(&mut scene, 0.016);
    assert!((scene.platforms()[0].position().x - 0.016).abs() < 1e-12);
    working_set.release(&mut scene);
}

// ─── External Force Tests ─────────────────────────────────────

#[test]
fn force_material_launches_resting_body() {
    let config = config();
    let mut scene = StaticScene::new();
    let spring = scene
        .add_material(SurfaceMaterial::new("spring", 1.0, 0.5).with_force(10.0))
        .unwrap();
    scene.add_object(false, Some(spring), &[floor_quad(10.0, 0.0)]).unwrap();
    let mut integrator = StepIntegrator::new(config.clone()).unwrap();
    let mut body = body_at(&config, DVec3::new(0.0, 0.0, RADIUS));

    integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
    assert!(body.velocity.z > 2.0, "{:?}", body.velocity);
    assert!(body.position.z > RADIUS + 0.01);
    assert!(integrator.contacts().is_empty());
}

#[test]
fn force_field_response_scales_with_mass() {
    let run = |mass_scale: f64| {
        let mut config = config();
        config.body.gravity = 0.0;
        config.modifiers.mass_scale = mass_scale;
        let mut scene = StaticScene::new();
        scene.add_force(RadialForce {
            center: DVec3::new(0.0, 0.0, 5.0),
            strength: 6.0,
            radius: 10.0,
        });
        let mut integrator = StepIntegrator::new(config.clone()).unwrap();
        let mut body = body_at(&config, DVec3::new(1.0, 0.0, 5.0));
        integrator.advance(&mut body, &ControlInput::idle(), &mut scene);
        (body, config.body.mass())
    };
    let (light, base_mass) = run(1.0);
    let (heavy, _) = run(3.0);

    assert!((light.mass - base_mass).abs() < 1e-12);
    assert!((heavy.mass - 3.0 * base_mass).abs() < 1e-12);
    // The field pushes away from its center.
    let expected = 6.0 / base_mass * 0.032;
    assert!((light.velocity - DVec3::new(expected, 0.0, 0.0)).length() < 1e-9, "{:?}", light.velocity);
    assert!((light.velocity.x / heavy.velocity.x - 3.0).abs() < 1e-9);
}

// ─── Serialization Tests ──────────────────────────────────────

#[test]
fn impact_contact_serializes_to_json() {
    let scene = floor_scene(0.5, 0.25);
    let sphere = SweptSphere {
        position: DVec3::new(0.0, 0.0, 1.0),
        velocity: DVec3::new(0.0, 0.0, -10.0),
        radius: RADIUS,
        budget: 1.0,
    };
    let mut cache = QueryCache::new();
    let outcome = test_move(&mut cache, &scene, &sphere, ObjectMask::COLLISION, false, None, false);
    let impact = outcome.impact.expect("impact");
    let json = serde_json::to_string(&impact).unwrap();
    let back: tumble_contact::ImpactContact = serde_json::from_str(&json).unwrap();
    assert_eq!(back, impact);
    assert!((back.coefficients.friction - 0.5).abs() < 1e-12);
}
