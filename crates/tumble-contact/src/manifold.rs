//! Contact manifold builder.
//!
//! Gathers every surface within `radius + ε` of the body: the nearest point
//! of each nearby polygon (its plane projection clipped into the polygon)
//! and every overlapping sphere. Geometric contacts are never merged; a body
//! resting across two adjoining polygons yields two contacts.

use glam::DVec3;
use tumble_material::Coefficients;
use tumble_math::{Aabb, Plane};
use tumble_scene::{GeometrySource, ObjectKind, Poly, PolySoup, QueryResult};
use tumble_telemetry::EventKind;
use tumble_types::{constants, MaterialId, ObjectId};

use crate::contact::{Contact, ContactSource};

/// Query box for a manifold build at `position`.
pub fn contact_bounds(position: DVec3, radius: f64) -> Aabb {
    Aabb::around_sphere(position, radius).inflated(constants::CONTACT_EPSILON)
}

/// Rebuilds `out` with the contacts of a sphere at `position`.
///
/// `body_velocity` is only used for collision notifications. Shapes notify
/// once per (object, material) pair per build; spheres always notify.
#[allow(clippy::too_many_arguments)]
pub fn find_contacts(
    candidates: &QueryResult,
    source: &dyn GeometrySource,
    position: DVec3,
    radius: f64,
    body_velocity: DVec3,
    clip_independent: bool,
    out: &mut Vec<Contact>,
    events: &mut Vec<EventKind>,
) {
    out.clear();

    for other in &candidates.spheres {
        let offset = other.position - position;
        let reach = other.radius + radius;
        if reach * reach * constants::SPHERE_CONTACT_SLACK <= offset.length_squared() {
            continue;
        }
        let toward = offset.normalize_or_zero();
        out.push(Contact {
            source: ContactSource::Body {
                id: other.id,
                mass: other.mass,
                bounce_restitution: other.bounce_restitution,
            },
            position: position + toward * radius,
            normal: -toward,
            surface_velocity: other.velocity,
            friction: 1.0,
            restitution: 1.0,
            force: 0.0,
            material: None,
            // Spheres are never pushed apart positionally.
            distance: radius,
            normal_force: 0.0,
        });
        let relative = body_velocity - other.velocity;
        events.push(EventKind::BodyCollision {
            other: other.id.0,
            relative_velocity: relative.to_array(),
        });
    }

    let mut notified: Vec<(ObjectId, Option<MaterialId>)> = Vec::new();
    let soup = &candidates.soup;
    for poly in &soup.polys {
        let Some(point) = nearest_point(soup, poly, position, radius, clip_independent) else {
            continue;
        };

        let delta = position - point;
        let distance = delta.length();
        if distance > radius + constants::CONTACT_EPSILON {
            continue;
        }
        let normal = if distance != 0.0 {
            delta / distance
        } else {
            poly.plane.normal
        };

        let surface_velocity = match poly.kind {
            ObjectKind::Platform(id) => source
                .platform(id)
                .map(|platform| platform.velocity())
                .unwrap_or(DVec3::ZERO),
            _ => DVec3::ZERO,
        };
        let coefficients = poly
            .material
            .and_then(|id| source.material(id))
            .unwrap_or(Coefficients::FALLBACK);

        out.push(Contact {
            source: ContactSource::from_poly(poly.object, poly.kind),
            position: point,
            normal,
            surface_velocity,
            friction: coefficients.friction,
            restitution: coefficients.restitution,
            force: coefficients.force,
            material: poly.material,
            distance,
            normal_force: 0.0,
        });

        if poly.kind == ObjectKind::Shape {
            let key = (poly.object, poly.material);
            if !notified.contains(&key) {
                notified.push(key);
                events.push(EventKind::SurfaceCollision {
                    object: poly.object.0,
                    material: poly.material.map(|m| m.0),
                    relative_velocity: (body_velocity - surface_velocity).to_array(),
                });
            }
        }
    }
}

/// Nearest point of `poly` to a sphere at `position`, or `None` when the
/// polygon is out of reach.
///
/// The plane projection is clipped edge by edge: a point outside an edge
/// snaps onto that edge, or onto one of its end vertices. With
/// `clip_independent` each edge clips the original projection and the last
/// snap wins; otherwise each snap feeds the next edge test.
fn nearest_point(
    soup: &PolySoup,
    poly: &Poly,
    position: DVec3,
    radius: f64,
    clip_independent: bool,
) -> Option<DVec3> {
    if poly.vertex_count == 0 {
        return None;
    }
    let plane = poly.plane;
    let distance = plane.distance(position);
    if distance.abs() > radius + constants::CONTACT_EPSILON {
        return None;
    }

    let mut probe = plane.project(position);
    let mut nearest = probe;
    // Half-width of the sphere's cross-section in the plane.
    let separation = (radius * radius - distance * distance).max(0.0).sqrt();

    let mut last = soup.last_vertex(poly);
    for vertex in soup.poly_vertices(poly) {
        if vertex == last {
            continue;
        }
        let Some(edge_plane) = Plane::edge_plane(plane.normal, last, vertex) else {
            last = vertex;
            continue;
        };
        let outside = edge_plane.distance(probe);
        if outside < 0.0 {
            if outside < -(separation + constants::CONTACT_EPSILON) {
                return None;
            }
            let edge = vertex - last;
            let t = (probe - last).dot(edge) / edge.length_squared();
            let (snapped, done) = if t > 1.0 {
                (vertex, false)
            } else if t < 0.0 {
                (last, false)
            } else {
                (last + edge * t, true)
            };
            if clip_independent {
                nearest = snapped;
            } else {
                probe = snapped;
                nearest = snapped;
            }
            if done {
                break;
            }
        }
        last = vertex;
    }

    Some(nearest)
}
