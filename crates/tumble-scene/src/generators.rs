//! Procedural geometry for tests and benchmarks.
//!
//! Every generator returns counter-clockwise convex polygons whose normals
//! point out of the solid.

use glam::DVec3;

/// Axis-aligned square in the XY plane at height `z`, facing +Z.
///
/// # Example
/// ```
/// use tumble_scene::generators::floor_quad;
/// let quad = floor_quad(10.0, 0.0);
/// assert_eq!(quad.len(), 4);
/// ```
pub fn floor_quad(size: f64, z: f64) -> Vec<DVec3> {
    let h = size * 0.5;
    vec![
        DVec3::new(-h, -h, z),
        DVec3::new(h, -h, z),
        DVec3::new(h, h, z),
        DVec3::new(-h, h, z),
    ]
}

/// The same square split into two triangles sharing the diagonal
/// `(-h, -h) → (h, h)`.
pub fn floor_triangles(size: f64, z: f64) -> Vec<Vec<DVec3>> {
    let h = size * 0.5;
    let a = DVec3::new(-h, -h, z);
    let b = DVec3::new(h, -h, z);
    let c = DVec3::new(h, h, z);
    let d = DVec3::new(-h, h, z);
    vec![vec![a, b, c], vec![a, c, d]]
}

/// Six outward-facing faces of an axis-aligned box.
pub fn box_faces(min: DVec3, max: DVec3) -> Vec<Vec<DVec3>> {
    let p = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    vec![
        // +Z
        vec![p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)],
        // -Z
        vec![p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)],
        // +X
        vec![p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)],
        // -X
        vec![p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)],
        // +Y
        vec![p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)],
        // -Y
        vec![p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)],
    ]
}

/// Ramp rising along +X by `rise` over `length`, `width` wide, starting at
/// the origin.
pub fn ramp(length: f64, width: f64, rise: f64) -> Vec<DVec3> {
    let hw = width * 0.5;
    vec![
        DVec3::new(0.0, -hw, 0.0),
        DVec3::new(length, -hw, rise),
        DVec3::new(length, hw, rise),
        DVec3::new(0.0, hw, 0.0),
    ]
}

/// Vertical wall facing `-X` at `x`, spanning `y` in `[-half, half]` and `z`
/// in `[0, height]`.
pub fn wall_facing_neg_x(x: f64, half: f64, height: f64) -> Vec<DVec3> {
    vec![
        DVec3::new(x, -half, 0.0),
        DVec3::new(x, -half, height),
        DVec3::new(x, half, height),
        DVec3::new(x, half, 0.0),
    ]
}
