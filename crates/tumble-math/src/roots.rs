//! Quadratic root helpers for time-of-impact equations.

use glam::DVec3;

/// Real roots of `a t² + b t + c = 0`, smallest first.
///
/// Returns `None` when the equation is not quadratic (`a == 0`) or has no
/// real solution. A degenerate leading coefficient is a rejected candidate,
/// never an error.
pub fn ordered_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt = discriminant.sqrt();
    let half_inv_a = 0.5 / a;
    let t1 = (-b - sqrt) * half_inv_a;
    let t2 = (-b + sqrt) * half_inv_a;
    if t2 < t1 {
        Some((t2, t1))
    } else {
        Some((t1, t2))
    }
}

/// Earliest normalized time at which a sphere moving from `a0` to `a1` with
/// radius `ra` overlaps a static sphere at `b` with radius `rb`.
///
/// The result is a fraction of the segment in `[0, 1)`. Already-overlapping
/// spheres report `0`. Movements shorter than `0.1` units never report.
pub fn capsule_sphere_nearest_overlap(
    a0: DVec3,
    a1: DVec3,
    ra: f64,
    b: DVec3,
    rb: f64,
) -> Option<f64> {
    let v = a1 - a0;
    let a0b = a0 - b;
    let d1 = a0b.dot(v);
    let d2 = a0b.length_squared();
    let d3 = v.length_squared();
    let r2 = (ra + rb) * (ra + rb);

    if d2 < r2 {
        return Some(0.0);
    }
    if d3 < 0.01 {
        return None;
    }

    let radicand = d1 * d1 - d2 * d3 + d3 * r2;
    if radicand < 0.0 {
        return None;
    }
    let s = radicand.sqrt();
    let t1 = (-d1 - s) / d3;
    let t2 = (-d1 + s) / d3;

    if t1 > 0.0 && t1 < 1.0 {
        Some(t1)
    } else if t2 > 0.0 && t2 < 1.0 {
        Some(t2)
    } else if t1 < 0.0 && t2 > 0.0 {
        Some(0.0)
    } else {
        None
    }
}
