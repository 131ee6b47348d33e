//! Polygon soup returned by geometry queries.
//!
//! Vertices are shared in one array and each polygon references a run of
//! `indices`. Polygons are wound counter-clockwise seen from the side their
//! plane normal points to.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tumble_math::{Aabb, Plane};
use tumble_types::{MaterialId, ObjectId, PlatformId, TumbleError, TumbleResult};

/// What kind of object owns a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Immobile level geometry.
    Interior,
    /// Immobile shape that receives collision notifications.
    Shape,
    /// Geometry of a moving platform.
    Platform(PlatformId),
}

/// One convex polygon of the soup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Poly {
    /// Supporting plane, normal pointing out of the solid.
    pub plane: Plane,
    /// First entry of this polygon in [`PolySoup::indices`].
    pub vertex_start: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Material index, `None` for the fallback coefficients.
    pub material: Option<MaterialId>,
    /// Owning object.
    pub object: ObjectId,
    pub kind: ObjectKind,
}

/// World-space polygon soup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolySoup {
    pub vertices: Vec<DVec3>,
    pub indices: Vec<u32>,
    pub polys: Vec<Poly>,
}

impl PolySoup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all polygons, keeping allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.polys.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// Adds a convex polygon, computing its plane from the winding.
    ///
    /// Fails for fewer than three vertices or a zero-area loop.
    pub fn add_polygon(
        &mut self,
        object: ObjectId,
        kind: ObjectKind,
        material: Option<MaterialId>,
        vertices: &[DVec3],
    ) -> TumbleResult<()> {
        let plane = polygon_plane(vertices)?;
        self.push_with_plane(object, kind, material, plane, vertices);
        Ok(())
    }

    fn push_with_plane(
        &mut self,
        object: ObjectId,
        kind: ObjectKind,
        material: Option<MaterialId>,
        plane: Plane,
        vertices: &[DVec3],
    ) {
        let vertex_start = self.indices.len() as u32;
        for &v in vertices {
            self.indices.push(self.vertices.len() as u32);
            self.vertices.push(v);
        }
        self.polys.push(Poly {
            plane,
            vertex_start,
            vertex_count: vertices.len() as u32,
            material,
            object,
            kind,
        });
    }

    /// Vertex `i` of `poly`.
    #[inline]
    pub fn vertex(&self, poly: &Poly, i: u32) -> DVec3 {
        self.vertices[self.indices[(poly.vertex_start + i) as usize] as usize]
    }

    /// Last vertex of `poly`, the start of its closing edge.
    #[inline]
    pub fn last_vertex(&self, poly: &Poly) -> DVec3 {
        self.vertex(poly, poly.vertex_count - 1)
    }

    /// Iterates the vertices of `poly` in winding order.
    pub fn poly_vertices<'a>(&'a self, poly: &'a Poly) -> impl Iterator<Item = DVec3> + 'a {
        (0..poly.vertex_count).map(move |i| self.vertex(poly, i))
    }

    /// Bounding box of one polygon.
    pub fn poly_bounds(&self, poly: &Poly) -> Aabb {
        let first = self.vertex(poly, 0);
        self.poly_vertices(poly)
            .fold(Aabb::new(first, first), |b, v| Aabb::new(b.min.min(v), b.max.max(v)))
    }

    /// Bounding box of the whole soup, `None` if empty.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Appends the polygons of `other` whose bounds overlap `bounds`,
    /// moved by `offset`.
    pub fn append_overlapping(&mut self, other: &PolySoup, bounds: &Aabb, offset: DVec3) {
        let mut scratch = Vec::new();
        for poly in &other.polys {
            if !other.poly_bounds(poly).translated(offset).overlaps(bounds) {
                continue;
            }
            scratch.clear();
            scratch.extend(other.poly_vertices(poly).map(|v| v + offset));
            let plane = poly.plane.translated(offset);
            self.push_with_plane(poly.object, poly.kind, poly.material, plane, &scratch);
        }
    }

    /// Checks index ranges and plane normals.
    pub fn validate(&self) -> TumbleResult<()> {
        for (i, poly) in self.polys.iter().enumerate() {
            if poly.vertex_count < 3 {
                return Err(TumbleError::InvalidGeometry(format!(
                    "polygon {i} has {} vertices",
                    poly.vertex_count
                )));
            }
            let end = (poly.vertex_start + poly.vertex_count) as usize;
            if end > self.indices.len() {
                return Err(TumbleError::InvalidGeometry(format!(
                    "polygon {i} indexes past the index buffer"
                )));
            }
            for &index in &self.indices[poly.vertex_start as usize..end] {
                if index as usize >= self.vertices.len() {
                    return Err(TumbleError::InvalidGeometry(format!(
                        "polygon {i} references vertex {index} of {}",
                        self.vertices.len()
                    )));
                }
            }
            if (poly.plane.normal.length() - 1.0).abs() > 1e-6 {
                return Err(TumbleError::InvalidGeometry(format!(
                    "polygon {i} has a non-unit plane normal"
                )));
            }
        }
        Ok(())
    }
}

/// Plane of a counter-clockwise polygon using Newell's method.
pub fn polygon_plane(vertices: &[DVec3]) -> TumbleResult<Plane> {
    if vertices.len() < 3 {
        return Err(TumbleError::InvalidGeometry(format!(
            "polygon needs at least 3 vertices, got {}",
            vertices.len()
        )));
    }

    let mut normal = DVec3::ZERO;
    let mut centroid = DVec3::ZERO;
    let mut prev = vertices[vertices.len() - 1];
    for &v in vertices {
        normal += prev.cross(v);
        centroid += v;
        prev = v;
    }
    centroid /= vertices.len() as f64;

    Plane::from_point_normal(centroid, normal)
        .ok_or_else(|| TumbleError::InvalidGeometry("polygon has zero area".into()))
}
