//! Swept collision solver.
//!
//! Moves a sphere along a straight line and finds the earliest time it
//! touches a polygon face, edge or corner, or another sphere. All candidate
//! tests share one running best time, so a later candidate only wins by
//! being strictly earlier than everything scanned before it.

use glam::DVec3;
use tumble_material::Coefficients;
use tumble_math::{capsule_sphere_nearest_overlap, ordered_roots, Aabb, Plane};
use tumble_scene::{GeometrySource, ObjectMask, Poly, PolySoup, QueryResult};
use tumble_types::{constants, BodyId};

use crate::cache::QueryCache;
use crate::contact::{ContactSource, ImpactContact};

/// A sphere moving at constant velocity for at most `budget` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptSphere {
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius: f64,
    /// Time available for the move (seconds).
    pub budget: f64,
}

/// Result of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOutcome {
    /// Position reached.
    pub position: DVec3,
    /// Time consumed, in `[0, budget]`.
    pub time: f64,
    /// Contact at the impact, if the move was cut short.
    pub impact: Option<ImpactContact>,
}

impl SweepOutcome {
    /// Outcome of a move that never started.
    pub fn unmoved(sphere: &SweptSphere) -> Self {
        Self {
            position: sphere.position,
            time: sphere.budget,
            impact: None,
        }
    }

    #[inline]
    pub fn hit(&self) -> bool {
        self.impact.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
enum Struck {
    Nothing,
    Sphere { index: usize, normal: DVec3 },
    Poly(usize),
}

/// Running best candidate of one sweep.
struct Best {
    time: f64,
    position: DVec3,
    contact_point: DVec3,
    sphere_time: f64,
    struck: Struck,
}

impl Best {
    fn accept_poly(&mut self, index: usize, sphere: &SweptSphere, t: f64, contact_point: DVec3) {
        self.time = t;
        self.position = sphere.position + sphere.velocity * t;
        // Ties go to the sphere.
        if matches!(self.struck, Struck::Sphere { .. }) && self.sphere_time <= t {
            return;
        }
        self.contact_point = contact_point;
        self.struck = Struck::Poly(index);
    }
}

/// Query box for a sweep: the sphere's box, padded, stretched along the move.
pub fn sweep_bounds(sphere: &SweptSphere) -> Aabb {
    Aabb::around_sphere(sphere.position, sphere.radius)
        .inflated(constants::SWEEP_BOX_SLACK)
        .swept(sphere.velocity * sphere.budget)
}

/// Queries the source through `cache` and sweeps against the candidates.
///
/// An empty mask sweeps against nothing. Moves slower than
/// [`constants::MIN_SWEEP_SPEED`] return immediately without moving.
#[allow(clippy::too_many_arguments)]
pub fn test_move(
    cache: &mut QueryCache,
    source: &dyn GeometrySource,
    sphere: &SweptSphere,
    mask: ObjectMask,
    include_platforms: bool,
    exclude: Option<BodyId>,
    always_refresh: bool,
) -> SweepOutcome {
    if sphere.velocity.length() < constants::MIN_SWEEP_SPEED {
        return SweepOutcome::unmoved(sphere);
    }
    if mask.is_empty() {
        return sweep(&QueryResult::default(), source, sphere, false);
    }
    let bounds = sweep_bounds(sphere);
    let candidates = cache.fetch(source, &bounds, mask, include_platforms, exclude, always_refresh);
    sweep(candidates, source, sphere, mask.contains(ObjectMask::BODY))
}

/// Sweeps `sphere` against `candidates` and returns the earliest impact.
///
/// Without an impact the sphere travels the whole budget. Spheres are only
/// tested when `include_spheres` is set; a sphere impact at the same time as
/// a polygon impact wins.
pub fn sweep(
    candidates: &QueryResult,
    source: &dyn GeometrySource,
    sphere: &SweptSphere,
    include_spheres: bool,
) -> SweepOutcome {
    let speed = sphere.velocity.length();
    if speed < constants::MIN_SWEEP_SPEED {
        return SweepOutcome::unmoved(sphere);
    }
    let direction = sphere.velocity / speed;
    let end = sphere.position + sphere.velocity * sphere.budget;

    let mut best = Best {
        time: sphere.budget,
        position: end,
        contact_point: DVec3::ZERO,
        sphere_time: sphere.budget,
        struck: Struck::Nothing,
    };

    if include_spheres {
        for (index, other) in candidates.spheres.iter().enumerate() {
            let Some(fraction) = capsule_sphere_nearest_overlap(
                sphere.position,
                end,
                sphere.radius,
                other.position,
                other.radius,
            ) else {
                continue;
            };
            let t = fraction * sphere.budget;
            if t > best.time {
                continue;
            }
            let p = sphere.position + sphere.velocity * t;
            let normal = (p - other.position).normalize_or_zero();
            // Only closing spheres collide.
            if (sphere.velocity - other.velocity).dot(normal) >= 0.0 {
                continue;
            }
            best.time = t;
            best.sphere_time = t;
            best.position = p;
            best.contact_point = p - normal * sphere.radius;
            best.struck = Struck::Sphere { index, normal };
        }
    }

    let soup = &candidates.soup;
    for (index, poly) in soup.polys.iter().enumerate() {
        sweep_poly(soup, index, poly, sphere, direction, &mut best);
    }

    if best.time >= sphere.budget {
        return SweepOutcome {
            position: best.position,
            time: sphere.budget,
            impact: None,
        };
    }

    let impact = match best.struck {
        Struck::Sphere { index, normal } => candidates.spheres.get(index).map(|other| ImpactContact {
            position: best.contact_point,
            normal,
            coefficients: Coefficients::FALLBACK,
            material: None,
            source: ContactSource::Body {
                id: other.id,
                mass: other.mass,
                bounce_restitution: other.bounce_restitution,
            },
        }),
        Struck::Poly(index) => soup.polys.get(index).map(|poly| {
            let normal = (best.position - best.contact_point)
                .try_normalize()
                .unwrap_or(poly.plane.normal);
            let coefficients = poly
                .material
                .and_then(|id| source.material(id))
                .unwrap_or(Coefficients::FALLBACK);
            ImpactContact {
                position: best.contact_point,
                normal,
                coefficients,
                material: poly.material,
                source: ContactSource::from_poly(poly.object, poly.kind),
            }
        }),
        Struck::Nothing => None,
    };

    SweepOutcome {
        position: best.position,
        time: best.time,
        impact,
    }
}

fn sweep_poly(
    soup: &PolySoup,
    index: usize,
    poly: &Poly,
    sphere: &SweptSphere,
    direction: DVec3,
    best: &mut Best,
) {
    let plane = poly.plane;
    let radius = sphere.radius;

    // Heading away from the plane, or never reaching it before the best time.
    if plane.normal.dot(direction) > -constants::FACING_TOLERANCE
        || plane.distance(best.position) > radius
    {
        return;
    }
    if poly.vertex_count == 0 {
        return;
    }

    let t = (radius - plane.distance(sphere.position)) / plane.normal.dot(sphere.velocity);
    if t >= 0.0 && best.time >= t {
        let at = sphere.position + sphere.velocity * t;
        if inside_edges(soup, poly, &plane, at) {
            best.accept_poly(index, sphere, t, plane.project(at));
            return;
        }
    }

    let radius_sq = radius * radius;
    let mut last = soup.last_vertex(poly);
    for i in 0..poly.vertex_count {
        let this = soup.vertex(poly, i);
        sweep_edge(index, sphere, this, last, radius_sq, best);
        last = this;
    }
}

/// True when `point` lies on the inner side of every edge of `poly`.
fn inside_edges(soup: &PolySoup, poly: &Poly, plane: &Plane, point: DVec3) -> bool {
    let mut last = soup.last_vertex(poly);
    for this in soup.poly_vertices(poly) {
        if this == last {
            continue;
        }
        let edge = Plane::edge_plane(plane.normal, last, this);
        last = this;
        if let Some(edge) = edge {
            if edge.distance(point) < 0.0 {
                return false;
            }
        }
    }
    true
}

/// Edge test for the edge `last → this`, falling back to its two corners.
fn sweep_edge(
    index: usize,
    sphere: &SweptSphere,
    this: DVec3,
    last: DVec3,
    radius_sq: f64,
    best: &mut Best,
) {
    let p = sphere.position;
    let v = sphere.velocity;
    let edge = last - this;
    let offset = p - this;

    let vel_rejection = edge.cross(v);
    let pos_rejection = edge.cross(offset);
    let a = vel_rejection.length_squared();
    let b = 2.0 * pos_rejection.dot(vel_rejection);
    let c = pos_rejection.length_squared() - edge.length_squared() * radius_sq;

    let Some((t1, t2)) = ordered_roots(a, b, c) else {
        return;
    };
    if t2 <= constants::ROOT_EPSILON || best.time <= t1 {
        return;
    }

    if t1 >= 0.0 {
        let length = edge.length();
        let along = (v * t1 + offset).dot(edge) / length;
        if along < -sphere.radius || along > length + sphere.radius {
            return;
        }
        if (0.0..=length).contains(&along) {
            best.accept_poly(index, sphere, t1, this + edge * (along / length));
            return;
        }
    }

    for corner in [this, last] {
        if let Some(t) = corner_time(sphere, corner, radius_sq, best.time) {
            best.accept_poly(index, sphere, t, corner);
        }
    }
}

/// Time at which the sphere surface reaches `corner`, if before `best_time`.
fn corner_time(sphere: &SweptSphere, corner: DVec3, radius_sq: f64, best_time: f64) -> Option<f64> {
    let offset = sphere.position - corner;
    let a = sphere.velocity.length_squared();
    let b = 2.0 * offset.dot(sphere.velocity);
    let c = offset.length_squared() - radius_sq;

    let (mut t1, t2) = ordered_roots(a, b, c)?;
    if t2 <= constants::ROOT_EPSILON || best_time <= t1 {
        return None;
    }
    // Grazing contacts that started a hair in the past count as now.
    if t1 <= 0.0 && t1 > -constants::ROOT_EPSILON {
        t1 = 0.0;
    }
    (t1 >= 0.0).then_some(t1)
}
