//! Ray casting against triangle geometry
//!
//! Rays and positions are in mesh-local space; callers apply any
//! world-to-local transform before querying.

use crate::math::Vec3;

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray through two points. Useful for "aim from hand at target" queries.
    pub fn through(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray-triangle intersection.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    pub point: Vec3,
    /// Distance along the ray (in units of the normalized direction).
    pub t: f32,
    /// Barycentric coordinates relative to v1 and v2.
    pub u: f32,
    pub v: f32,
}

/// Result of a ray-mesh intersection.
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    pub point: Vec3,
    pub distance: f32,
    /// Start of the hit triangle in the index buffer (always a multiple of 3).
    pub tri_base: usize,
}

const DET_EPSILON: f32 = 1e-6;

/// Moller-Trumbore ray-triangle intersection, single sided.
///
/// Front faces wind counter-clockwise when viewed against the ray, i.e.
/// `cross(v1 - v0, v2 - v0)` points back toward the ray origin. Back faces
/// and degenerate (near-zero-area) triangles report no hit because the
/// determinant falls below the epsilon.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    let v0v1 = v1 - v0;
    let v0v2 = v2 - v0;
    let pvec = ray.direction.cross(v0v2);
    let det = v0v1.dot(pvec);

    // Back-facing or degenerate
    if det < DET_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray.origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(v0v1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = v0v2.dot(qvec) * inv_det;
    Some(TriangleHit {
        point: ray.at(t),
        t,
        u,
        v,
    })
}

/// Cast a ray against every triangle of an indexed mesh and return the
/// closest hit in front of the origin. Brute force; meshes in this editor
/// are small enough that no acceleration structure pays for itself.
pub fn ray_mesh_intersect(ray: &Ray, vertices: &[Vec3], triangles: &[usize]) -> Option<MeshHit> {
    let mut best: Option<MeshHit> = None;
    for base in (0..triangles.len()).step_by(3) {
        let v0 = vertices[triangles[base]];
        let v1 = vertices[triangles[base + 1]];
        let v2 = vertices[triangles[base + 2]];
        if let Some(hit) = ray_triangle_intersect(ray, v0, v1, v2) {
            if hit.t > 0.0 && best.map_or(true, |b| hit.t < b.distance) {
                best = Some(MeshHit {
                    point: hit.point,
                    distance: hit.t,
                    tri_base: base,
                });
            }
        }
    }
    best
}

/// Index (into `triangles`, not into `vertices`) of the corner of the
/// triangle at `tri_base` nearest to `point`.
pub fn nearest_triangle_corner(
    point: Vec3,
    vertices: &[Vec3],
    triangles: &[usize],
    tri_base: usize,
) -> usize {
    let mut best = tri_base;
    let mut best_dist = f32::MAX;
    for i in 0..3 {
        let d = vertices[triangles[tri_base + i]].distance(point);
        if d < best_dist {
            best_dist = d;
            best = tri_base + i;
        }
    }
    best
}
