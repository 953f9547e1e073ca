//! The editable mesh model
//!
//! `MeshModel` owns the triangle-soup buffers (positions, UVs, triangle
//! indices) plus two derived structures: a per-corner edge list and the
//! weld-group index. Every mutation goes through methods here so the
//! derived data and the event queue stay consistent.
//!
//! Triangles are a soup on purpose. Corners are never shared between
//! faces (each carries its own UV), so adjacency is detected by comparing
//! vertex positions, not indices.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::event::{EventQueue, MeshEvent};
use crate::math::{Vec2, Vec3, distance_to_segment, nearest_point_on_segment};
use crate::ray::{Ray, nearest_triangle_corner, ray_mesh_intersect};
use crate::selection::{MeshEditMode, SelectionState};
use crate::weld::{recalc_weld_groups, welded_vertices};

/// Offset applied to extruded faces so the new geometry is visible
/// immediately, before the user drags it anywhere.
pub const EXTRUDE_SHIFT: Vec3 = Vec3 { x: 0.0, y: 0.1, z: 0.0 };

/// Errors from mesh construction and persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    Io(String),
    Serialization(String),
    Validation(String),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Io(msg) => write!(f, "IO error: {}", msg),
            MeshError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            MeshError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for MeshError {}

/// One directed edge of one triangle, as vertex indices.
/// Edges are per-corner and never deduplicated across triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshEdge {
    pub index0: usize,
    pub index1: usize,
}

/// A picked vertex.
#[derive(Debug, Clone, Copy)]
pub struct VertexPick {
    pub index: usize,
    pub position: Vec3,
    /// Distance from the tool tip to the picked vertex.
    pub distance: f32,
}

/// A picked face (triangle index, not index-buffer offset).
#[derive(Debug, Clone, Copy)]
pub struct FacePick {
    pub triangle: usize,
    pub point: Vec3,
    /// Distance along the ray to the hit point.
    pub distance: f32,
}

/// A picked edge. `index` is `triangle * 3 + corner`, addressing the edge
/// from that corner to the next one around the triangle.
#[derive(Debug, Clone, Copy)]
pub struct EdgePick {
    pub index: usize,
    pub nearest_point: Vec3,
}

/// Editable triangle mesh with derived weld groups and edge list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshModel {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    triangles: Vec<usize>,

    // Derived; rebuilt by reload()
    #[serde(skip)]
    edges: Vec<MeshEdge>,
    #[serde(skip)]
    weld_group: Vec<usize>,
    #[serde(skip)]
    events: EventQueue<MeshEvent>,
}

impl MeshModel {
    /// Build a model from raw buffers, validating their shape.
    pub fn from_buffers(
        vertices: Vec<Vec3>,
        uvs: Vec<Vec2>,
        triangles: Vec<usize>,
    ) -> Result<Self, MeshError> {
        if uvs.len() != vertices.len() {
            return Err(MeshError::Validation(format!(
                "uv count {} does not match vertex count {}",
                uvs.len(),
                vertices.len()
            )));
        }
        if triangles.len() % 3 != 0 {
            return Err(MeshError::Validation(format!(
                "triangle list length {} is not a multiple of 3",
                triangles.len()
            )));
        }
        if let Some(&bad) = triangles.iter().find(|&&i| i >= vertices.len()) {
            return Err(MeshError::Validation(format!(
                "triangle index {} out of range for {} vertices",
                bad,
                vertices.len()
            )));
        }

        let mut mesh = Self {
            vertices,
            uvs,
            triangles,
            edges: Vec::new(),
            weld_group: Vec::new(),
            events: EventQueue::new(),
        };
        mesh.reload();
        Ok(mesh)
    }

    /// A flat square in the XZ plane, facing up. 4 vertices, 2 triangles
    /// sharing the diagonal by position.
    pub fn plane(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Vec3::new(-h, 0.0, -h),
            Vec3::new(h, 0.0, -h),
            Vec3::new(-h, 0.0, h),
            Vec3::new(h, 0.0, h),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ];
        let triangles = vec![0, 2, 1, 1, 2, 3];
        let mut mesh = Self {
            vertices,
            uvs,
            triangles,
            edges: Vec::new(),
            weld_group: Vec::new(),
            events: EventQueue::new(),
        };
        mesh.reload();
        mesh
    }

    /// An axis-aligned cube centered at the origin. 24 vertices (4 per
    /// face, welded across faces only by position), 12 triangles.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let mut vertices = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut triangles = Vec::with_capacity(36);

        let mut push_quad = |c0: Vec3, right: Vec3, forward: Vec3| {
            let i = vertices.len();
            vertices.push(c0);
            vertices.push(c0 + right);
            vertices.push(c0 + forward);
            vertices.push(c0 + right + forward);
            uvs.push(Vec2::new(0.0, 0.0));
            uvs.push(Vec2::new(1.0, 0.0));
            uvs.push(Vec2::new(0.0, 1.0));
            uvs.push(Vec2::new(1.0, 1.0));
            // Outward normal = cross(forward, right)
            triangles.extend_from_slice(&[i, i + 2, i + 1, i + 1, i + 2, i + 3]);
        };

        let x = Vec3::new(size, 0.0, 0.0);
        let y = Vec3::new(0.0, size, 0.0);
        let z = Vec3::new(0.0, 0.0, size);
        push_quad(Vec3::new(-h, h, -h), x, z); // +Y
        push_quad(Vec3::new(-h, -h, -h), z, x); // -Y
        push_quad(Vec3::new(h, -h, -h), z, y); // +X
        push_quad(Vec3::new(-h, -h, -h), y, z); // -X
        push_quad(Vec3::new(-h, -h, h), y, x); // +Z
        push_quad(Vec3::new(-h, -h, -h), x, y); // -Z

        let mut mesh = Self {
            vertices,
            uvs,
            triangles,
            edges: Vec::new(),
            weld_group: Vec::new(),
            events: EventQueue::new(),
        };
        mesh.reload();
        mesh
    }

    /// Rebuild the derived edge list and weld-group index from the buffers.
    fn reload(&mut self) {
        self.edges.clear();
        for base in (0..self.triangles.len()).step_by(3) {
            for k in 0..3 {
                self.edges.push(MeshEdge {
                    index0: self.triangles[base + k],
                    index1: self.triangles[base + (k + 1) % 3],
                });
            }
        }
        self.weld_group = recalc_weld_groups(&self.vertices);
    }

    // --- accessors ---

    pub fn vertex(&self, index: usize) -> Vec3 {
        self.vertices[index]
    }

    pub fn uv(&self, index: usize) -> Vec2 {
        self.uvs[index]
    }

    pub fn edge(&self, index: usize) -> MeshEdge {
        self.edges[index]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn triangles(&self) -> &[usize] {
        &self.triangles
    }

    pub fn weld_group(&self, index: usize) -> usize {
        self.weld_group[index]
    }

    /// Normalized face normal of one triangle.
    pub fn triangle_normal(&self, triangle: usize) -> Vec3 {
        let base = triangle * 3;
        let v0 = self.vertices[self.triangles[base]];
        let v1 = self.vertices[self.triangles[base + 1]];
        let v2 = self.vertices[self.triangles[base + 2]];
        (v1 - v0).cross(v2 - v0).normalize()
    }

    /// Whether the triangle has an edge with these endpoint positions,
    /// in either direction. Matching is by exact position.
    pub fn has_edge(&self, triangle: usize, p0: Vec3, p1: Vec3) -> bool {
        let base = triangle * 3;
        for k in 0..3 {
            let a = self.vertices[self.triangles[base + k]];
            let b = self.vertices[self.triangles[base + (k + 1) % 3]];
            if (a == p0 && b == p1) || (a == p1 && b == p0) {
                return true;
            }
        }
        false
    }

    /// Drain pending change notifications.
    pub fn drain_events(&mut self) -> Vec<MeshEvent> {
        self.events.drain()
    }

    // --- picking ---

    /// Pick a vertex of the triangle struck by a ray from `origin` toward
    /// `target`: the corner nearest the tool tip (`target`), not the hit
    /// point, which differs on tilted faces. Both the hit point and the
    /// chosen vertex must lie within `max_dist` of `target`.
    pub fn find_vertex_index(&self, origin: Vec3, target: Vec3, max_dist: f32) -> Option<VertexPick> {
        let ray = Ray::through(origin, target);
        let hit = ray_mesh_intersect(&ray, &self.vertices, &self.triangles)?;
        if hit.point.distance(target) > max_dist {
            return None;
        }
        let corner = nearest_triangle_corner(target, &self.vertices, &self.triangles, hit.tri_base);
        let index = self.triangles[corner];
        let position = self.vertices[index];
        let distance = position.distance(target);
        if distance > max_dist {
            return None;
        }
        Some(VertexPick { index, position, distance })
    }

    /// Pick the face struck by a ray from `origin` toward `target`.
    pub fn find_face(&self, origin: Vec3, target: Vec3, max_dist: f32) -> Option<FacePick> {
        let ray = Ray::through(origin, target);
        let hit = ray_mesh_intersect(&ray, &self.vertices, &self.triangles)?;
        if hit.point.distance(target) > max_dist {
            return None;
        }
        Some(FacePick {
            triangle: hit.tri_base / 3,
            point: hit.point,
            distance: hit.distance,
        })
    }

    /// Pick the edge of the struck triangle nearest to the hit point.
    pub fn find_edge(&self, origin: Vec3, target: Vec3, max_dist: f32) -> Option<EdgePick> {
        let ray = Ray::through(origin, target);
        let hit = ray_mesh_intersect(&ray, &self.vertices, &self.triangles)?;
        if hit.point.distance(target) > max_dist {
            return None;
        }
        let mut best_corner = 0;
        let mut best_dist = f32::MAX;
        for k in 0..3 {
            let a = self.vertices[self.triangles[hit.tri_base + k]];
            let b = self.vertices[self.triangles[hit.tri_base + (k + 1) % 3]];
            let d = distance_to_segment(a, b, hit.point);
            if d < best_dist {
                best_dist = d;
                best_corner = k;
            }
        }
        let a = self.vertices[self.triangles[hit.tri_base + best_corner]];
        let b = self.vertices[self.triangles[hit.tri_base + (best_corner + 1) % 3]];
        Some(EdgePick {
            index: hit.tri_base + best_corner,
            nearest_point: nearest_point_on_segment(a, b, hit.point),
        })
    }

    /// Vertices of a face for grabbing: the triangle's 3 corners, plus the
    /// corners of one coplanar neighbor sharing exactly two positions (the
    /// other half of a quad). Only the first such neighbor is merged.
    pub fn find_face_vertices(&self, triangle: usize) -> BTreeMap<usize, Vec3> {
        let mut result = BTreeMap::new();
        let base = triangle * 3;
        let mut groups = HashSet::new();
        for k in 0..3 {
            let idx = self.triangles[base + k];
            result.insert(idx, self.vertices[idx]);
            groups.insert(self.weld_group[idx]);
        }

        let normal = self.triangle_normal(triangle);
        for other in 0..self.triangle_count() {
            if other == triangle {
                continue;
            }
            let other_base = other * 3;
            let shared: HashSet<usize> = (0..3)
                .map(|k| self.weld_group[self.triangles[other_base + k]])
                .filter(|g| groups.contains(g))
                .collect();
            if shared.len() == 2 && self.triangle_normal(other).approximately_equal(normal) {
                for k in 0..3 {
                    let idx = self.triangles[other_base + k];
                    result.insert(idx, self.vertices[idx]);
                }
                break;
            }
        }
        result
    }

    /// Vertices covered by the current selection: the selected vertices in
    /// Vertex mode, the corners of selected triangles in Face mode. Edge
    /// mode has no drag target and yields nothing.
    pub fn find_selection_vertices(
        &self,
        mode: MeshEditMode,
        selection: &SelectionState,
    ) -> BTreeMap<usize, Vec3> {
        let mut result = BTreeMap::new();
        match mode {
            MeshEditMode::Vertex => {
                for index in selection.selected(MeshEditMode::Vertex) {
                    result.insert(index, self.vertices[index]);
                }
            }
            MeshEditMode::Face => {
                for triangle in selection.selected(MeshEditMode::Face) {
                    for k in 0..3 {
                        let idx = self.triangles[triangle * 3 + k];
                        result.insert(idx, self.vertices[idx]);
                    }
                }
            }
            MeshEditMode::Edge => {}
        }
        result
    }

    // --- mutation ---

    /// Move a vertex and every vertex welded to it to `new_pos`.
    ///
    /// `update_derived` batches notification: callers moving many vertices
    /// in one frame pass false for all but the last call, so consumers see
    /// a single `GeometryChanged`. Weld groups are NOT recomputed; moving
    /// a group keeps its members coincident, so the index stays valid.
    pub fn shift_vertex_to(&mut self, index: usize, new_pos: Vec3, update_derived: bool) {
        for i in welded_vertices(&self.weld_group, index) {
            self.vertices[i] = new_pos;
        }
        if update_derived {
            self.events.send(MeshEvent::GeometryChanged);
        }
    }

    /// Shift a whole face by `delta`, moving each corner's weld group.
    pub fn shift_face(&mut self, triangle: usize, delta: Vec3) {
        let base = triangle * 3;
        let targets: Vec<(usize, Vec3)> = (0..3)
            .map(|k| {
                let idx = self.triangles[base + k];
                (idx, self.vertices[idx] + delta)
            })
            .collect();
        let last = targets.len() - 1;
        for (k, (idx, pos)) in targets.into_iter().enumerate() {
            self.shift_vertex_to(idx, pos, k == last);
        }
    }

    /// Shift the UV of a vertex by `delta`, propagating to welded vertices
    /// whose UV exactly matches the pre-shift value. Welded vertices on a
    /// different UV island keep their own coordinates.
    pub fn shift_uv(&mut self, index: usize, delta: Vec2) {
        let base_uv = self.uvs[index];
        for i in welded_vertices(&self.weld_group, index) {
            if self.uvs[i] == base_uv {
                self.uvs[i] = base_uv + delta;
                self.events.send(MeshEvent::UvChanged(i));
            }
        }
    }

    /// Extrude the Face-mode selection.
    ///
    /// Boundary edges are edges belonging to exactly one *selected*
    /// triangle, matched by endpoint positions; edges shared only with
    /// unselected triangles are boundaries too, which is what makes side
    /// walls appear there. Each boundary edge gets a quad wall (two copies
    /// of the edge at the old position, two at the extruded position), then
    /// the selected faces themselves shift by `EXTRUDE_SHIFT`. Derived
    /// data is rebuilt and `TopologyChanged` is emitted. With no boundary
    /// edges (nothing selected, or a closed selection) this is a no-op.
    pub fn do_extrude(&mut self, selection: &SelectionState) {
        let selected: Vec<usize> = selection.selected(MeshEditMode::Face).collect();

        let mut boundary: Vec<MeshEdge> = Vec::new();
        for &tri in &selected {
            let base = tri * 3;
            for k in 0..3 {
                let i0 = self.triangles[base + k];
                let i1 = self.triangles[base + (k + 1) % 3];
                let p0 = self.vertices[i0];
                let p1 = self.vertices[i1];
                let owners = selected
                    .iter()
                    .filter(|&&t| self.has_edge(t, p0, p1))
                    .count();
                if owners == 1 {
                    boundary.push(MeshEdge { index0: i0, index1: i1 });
                }
            }
        }
        if boundary.is_empty() {
            return;
        }

        // Side walls. The first pair of new vertices stays at the old edge
        // position, the second pair is pre-shifted to meet the moved cap.
        for edge in &boundary {
            let base = self.vertices.len();
            let p0 = self.vertices[edge.index0];
            let p1 = self.vertices[edge.index1];
            self.vertices.push(p0);
            self.vertices.push(p1);
            self.vertices.push(p0 + EXTRUDE_SHIFT);
            self.vertices.push(p1 + EXTRUDE_SHIFT);
            let uv0 = self.uvs[edge.index0];
            let uv1 = self.uvs[edge.index1];
            self.uvs.push(uv0);
            self.uvs.push(uv1);
            self.uvs.push(uv0);
            self.uvs.push(uv1);
            self.triangles
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        }

        // Shift each distinct cap vertex once, even when selected triangles
        // share index entries.
        let mut cap: HashSet<usize> = HashSet::new();
        for &tri in &selected {
            for k in 0..3 {
                cap.insert(self.triangles[tri * 3 + k]);
            }
        }
        for idx in cap {
            self.vertices[idx] = self.vertices[idx] + EXTRUDE_SHIFT;
        }

        self.reload();
        self.events.send(MeshEvent::TopologyChanged);
    }

    // --- persistence ---

    /// Save as brotli-compressed RON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), MeshError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| MeshError::Serialization(e.to_string()))?;

        let file = std::fs::File::create(path).map_err(|e| MeshError::Io(e.to_string()))?;
        let mut writer = brotli::CompressorWriter::new(file, 4096, 6, 22);
        writer
            .write_all(ron_string.as_bytes())
            .map_err(|e| MeshError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a mesh saved by `save_to_file`. Plain uncompressed RON is also
    /// accepted (detected by the first byte), so hand-written fixtures load
    /// too. Derived data is rebuilt after parsing.
    pub fn load_from_file(path: &Path) -> Result<Self, MeshError> {
        let bytes = std::fs::read(path).map_err(|e| MeshError::Io(e.to_string()))?;

        let first = bytes.first().copied().unwrap_or(0);
        let ron_string = if first == b'(' || first.is_ascii_whitespace() {
            String::from_utf8(bytes).map_err(|e| MeshError::Serialization(e.to_string()))?
        } else {
            let mut decompressed = String::new();
            brotli::Decompressor::new(&bytes[..], 4096)
                .read_to_string(&mut decompressed)
                .map_err(|e| MeshError::Io(e.to_string()))?;
            decompressed
        };

        let parsed: MeshModel =
            ron::from_str(&ron_string).map_err(|e| MeshError::Serialization(e.to_string()))?;
        // Re-validate through from_buffers so corrupt files cannot smuggle
        // out-of-range indices past the derived-data rebuild.
        MeshModel::from_buffers(parsed.vertices, parsed.uvs, parsed.triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn above(p: Vec3) -> Vec3 {
        p + Vec3::new(0.0, 5.0, 0.0)
    }

    #[test]
    fn test_from_buffers_validates() {
        let v = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)];
        let uv = vec![Vec2::ZERO; 3];

        // Mismatched UV count
        assert!(matches!(
            MeshModel::from_buffers(v.clone(), vec![Vec2::ZERO; 2], vec![0, 1, 2]),
            Err(MeshError::Validation(_))
        ));
        // Not a multiple of 3
        assert!(matches!(
            MeshModel::from_buffers(v.clone(), uv.clone(), vec![0, 1]),
            Err(MeshError::Validation(_))
        ));
        // Out-of-range index
        assert!(matches!(
            MeshModel::from_buffers(v.clone(), uv.clone(), vec![0, 1, 3]),
            Err(MeshError::Validation(_))
        ));
        assert!(MeshModel::from_buffers(v, uv, vec![0, 2, 1]).is_ok());
    }

    #[test]
    fn test_plane_shape() {
        let mesh = MeshModel::plane(2.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.edge_count(), 6);
        // All positions unique, so every vertex is its own weld group
        for i in 0..4 {
            assert_eq!(mesh.weld_group(i), i);
        }
        assert!(mesh.triangle_normal(0).approximately_equal(Vec3::UP));
        assert!(mesh.triangle_normal(1).approximately_equal(Vec3::UP));
    }

    #[test]
    fn test_cube_shape_and_welding() {
        let mesh = MeshModel::cube(1.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        // Each cube corner appears on 3 faces
        for i in 0..24 {
            let group = mesh.weld_group(i);
            let members = (0..24).filter(|&j| mesh.weld_group(j) == group).count();
            assert_eq!(members, 3, "vertex {} has group of size {}", i, members);
        }
        // All normals unit length and axis aligned
        for t in 0..12 {
            let n = mesh.triangle_normal(t);
            assert!((n.len() - 1.0).abs() < 1e-5);
            assert!((n.x.abs() + n.y.abs() + n.z.abs() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_find_face_and_miss() {
        let mesh = MeshModel::plane(2.0);
        // Aim down at the center of triangle 0 (the -x/-z half)
        let target = Vec3::new(-0.5, 0.0, -0.1);
        let pick = mesh.find_face(above(target), target, 0.5).unwrap();
        assert_eq!(pick.triangle, 0);
        // Ray distance: origin is 5 above the plane
        assert!((pick.distance - 5.0).abs() < 1e-5);

        // Aim at the other half
        let target = Vec3::new(0.5, 0.0, 0.1);
        let pick = mesh.find_face(above(target), target, 0.5).unwrap();
        assert_eq!(pick.triangle, 1);

        // Aim off the plane entirely
        let target = Vec3::new(5.0, 0.0, 5.0);
        assert!(mesh.find_face(above(target), target, 0.5).is_none());

        // Hit exists but lands farther from the target than max_dist
        let target = Vec3::new(-0.5, 3.0, -0.1);
        assert!(mesh.find_face(above(target), target, 0.5).is_none());
    }

    #[test]
    fn test_find_vertex_index_picks_nearest_corner() {
        let mesh = MeshModel::plane(2.0);
        // Near the (-1, 0, -1) corner, which is vertex 0
        let target = Vec3::new(-0.8, 0.0, -0.8);
        let pick = mesh.find_vertex_index(above(target), target, 1.0).unwrap();
        assert_eq!(pick.index, 0);
        assert_eq!(pick.position, Vec3::new(-1.0, 0.0, -1.0));

        // Reported distance is tool-tip-to-vertex
        let expected = target.distance(pick.position);
        assert!((pick.distance - expected).abs() < 1e-5);

        // Same aim with a tight radius: the face is hit but the corner
        // is out of range
        assert!(mesh.find_vertex_index(above(target), target, 0.1).is_none());
    }

    #[test]
    fn test_find_vertex_index_anchors_at_tool_tip() {
        // Tilted face where the corner nearest the ray hit differs from
        // the corner nearest the tool tip.
        let vertices = vec![
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 2.0),
            Vec3::new(1.0, -1.0, -0.4),
        ];
        let uvs = vec![Vec2::ZERO; 3];
        let mesh = MeshModel::from_buffers(vertices, uvs, vec![0, 1, 2]).unwrap();

        let origin = Vec3::new(0.6, 10.0, 0.2);
        let target = Vec3::new(0.6, 2.0, 0.2);
        // The ray strikes the face at (0.6, -0.6, 0.2), next to the
        // (1, -1, -0.4) corner; the tool tip sits nearest (-1, 1, 0).
        let pick = mesh.find_vertex_index(origin, target, 5.0).unwrap();
        assert_eq!(pick.index, 0);
        assert!((pick.distance - target.distance(mesh.vertex(0))).abs() < 1e-5);
    }

    #[test]
    fn test_find_edge_picks_nearest_edge_of_hit_triangle() {
        let mesh = MeshModel::plane(2.0);
        // Triangle 0 is (0, 2, 1): corners (-1,-1), (-1,1), (1,-1) in xz.
        // Aim near the z = -1 border, inside triangle 0; that border is the
        // edge from corner 2 (vertex 1) to corner 0 (vertex 0)? Edge k runs
        // corner k -> k+1: k=0: v0->v2 (x=-1 border), k=1: v2->v1
        // (diagonal), k=2: v1->v0 (z=-1 border).
        let target = Vec3::new(0.0, 0.0, -0.9);
        let pick = mesh.find_edge(above(target), target, 1.0).unwrap();
        assert_eq!(pick.index, 2);
        let edge = mesh.edge(pick.index);
        assert_eq!((edge.index0, edge.index1), (1, 0));
        assert!(pick.nearest_point.approximately_equal(Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_find_face_vertices_merges_quad_partner() {
        let mesh = MeshModel::plane(2.0);
        // Either half of the quad should grab all 4 vertices
        let verts = mesh.find_face_vertices(0);
        assert_eq!(verts.len(), 4);
        assert!(verts.contains_key(&3));

        // A lone cube face has no coplanar neighbor sharing 2 corners
        let cube = MeshModel::cube(1.0);
        let verts = cube.find_face_vertices(0);
        assert_eq!(verts.len(), 3);
    }

    #[test]
    fn test_find_selection_vertices() {
        let mesh = MeshModel::cube(1.0);
        let mut sel = SelectionState::new();
        sel.set_selected(MeshEditMode::Vertex, 5, true);
        let verts = mesh.find_selection_vertices(MeshEditMode::Vertex, &sel);
        assert_eq!(verts.len(), 1);
        assert_eq!(verts[&5], mesh.vertex(5));

        let mut sel = SelectionState::new();
        sel.set_selected(MeshEditMode::Face, 0, true);
        sel.set_selected(MeshEditMode::Face, 1, true);
        // Triangles 0 and 1 are the same cube face: 4 distinct corners
        let verts = mesh.find_selection_vertices(MeshEditMode::Face, &sel);
        assert_eq!(verts.len(), 4);
    }

    #[test]
    fn test_shift_vertex_moves_whole_weld_group() {
        let mut mesh = MeshModel::cube(1.0);
        let original = mesh.vertex(0);
        let group = mesh.weld_group(0);
        let members: Vec<usize> = (0..24).filter(|&j| mesh.weld_group(j) == group).collect();
        assert_eq!(members.len(), 3);

        let new_pos = Vec3::new(2.0, 3.0, 4.0);
        mesh.shift_vertex_to(0, new_pos, true);
        for &m in &members {
            assert_eq!(mesh.vertex(m), new_pos);
        }
        // No other vertex moved
        for j in 0..24 {
            if !members.contains(&j) {
                assert_ne!(mesh.vertex(j), new_pos);
            }
        }
        assert_ne!(original, new_pos);
        assert_eq!(mesh.drain_events(), vec![MeshEvent::GeometryChanged]);
    }

    #[test]
    fn test_shift_vertex_batching_defers_event() {
        let mut mesh = MeshModel::cube(1.0);
        mesh.shift_vertex_to(0, Vec3::new(9.0, 9.0, 9.0), false);
        assert!(mesh.drain_events().is_empty());
        mesh.shift_vertex_to(4, Vec3::new(8.0, 8.0, 8.0), true);
        assert_eq!(mesh.drain_events(), vec![MeshEvent::GeometryChanged]);
    }

    #[test]
    fn test_shift_face_moves_corners_once() {
        let mut mesh = MeshModel::plane(2.0);
        let before: Vec<Vec3> = (0..4).map(|i| mesh.vertex(i)).collect();
        let delta = Vec3::new(0.0, 1.0, 0.0);
        mesh.shift_face(0, delta);
        // Triangle 0 uses vertices 0, 2, 1; vertex 3 stays put
        assert_eq!(mesh.vertex(0), before[0] + delta);
        assert_eq!(mesh.vertex(1), before[1] + delta);
        assert_eq!(mesh.vertex(2), before[2] + delta);
        assert_eq!(mesh.vertex(3), before[3]);
        assert_eq!(mesh.drain_events(), vec![MeshEvent::GeometryChanged]);
    }

    #[test]
    fn test_shift_uv_respects_uv_islands() {
        // Two triangles welded at a shared position but with different UVs
        // there: shifting one corner's UV must not drag the other island.
        let shared = Vec3::new(0.0, 0.0, 0.0);
        let vertices = vec![
            shared,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            shared,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 0.5),
            Vec2::new(0.5, 1.0),
            Vec2::new(0.25, 0.25), // welded to vertex 0, different island
            Vec2::new(0.0, 0.25),
            Vec2::new(0.25, 0.0),
        ];
        let triangles = vec![0, 2, 1, 3, 5, 4];
        let mut mesh = MeshModel::from_buffers(vertices, uvs, triangles).unwrap();
        assert_eq!(mesh.weld_group(3), 0);

        mesh.shift_uv(0, Vec2::new(0.1, 0.0));
        assert_eq!(mesh.uv(0), Vec2::new(0.6, 0.5));
        assert_eq!(mesh.uv(3), Vec2::new(0.25, 0.25));
        assert_eq!(mesh.drain_events(), vec![MeshEvent::UvChanged(0)]);
    }

    #[test]
    fn test_shift_uv_moves_matching_welded_uvs() {
        let shared = Vec3::new(0.0, 0.0, 0.0);
        let vertices = vec![
            shared,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            shared,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];
        // Same UV at both copies of the shared position
        let uvs = vec![
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 0.5),
            Vec2::new(0.5, 1.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(0.0, 0.25),
            Vec2::new(0.25, 0.0),
        ];
        let triangles = vec![0, 2, 1, 3, 5, 4];
        let mut mesh = MeshModel::from_buffers(vertices, uvs, triangles).unwrap();

        mesh.shift_uv(0, Vec2::new(0.1, 0.0));
        assert_eq!(mesh.uv(0), Vec2::new(0.6, 0.5));
        assert_eq!(mesh.uv(3), Vec2::new(0.6, 0.5));
        let events = mesh.drain_events();
        assert!(events.contains(&MeshEvent::UvChanged(0)));
        assert!(events.contains(&MeshEvent::UvChanged(3)));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_extrude_single_triangle_of_quad() {
        let mut mesh = MeshModel::plane(2.0);
        let mut sel = SelectionState::new();
        sel.set_selected(MeshEditMode::Face, 0, true);

        let cap_before: Vec<Vec3> = [0, 2, 1].iter().map(|&i| mesh.vertex(i)).collect();
        mesh.do_extrude(&sel);

        // All 3 edges of the lone selected triangle are boundaries (the
        // diagonal neighbor is unselected): 3 walls of 2 triangles each.
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.edge_count(), 24);

        // Cap vertices moved up
        assert_eq!(mesh.vertex(0), cap_before[0] + EXTRUDE_SHIFT);
        assert_eq!(mesh.vertex(2), cap_before[1] + EXTRUDE_SHIFT);
        assert_eq!(mesh.vertex(1), cap_before[2] + EXTRUDE_SHIFT);
        // The unselected triangle's exclusive corner stayed
        assert_eq!(mesh.vertex(3), Vec3::new(1.0, 0.0, 1.0));

        // Weld groups were rebuilt: each wall-top vertex welds to a moved
        // cap vertex.
        let groups = (0..mesh.vertex_count())
            .map(|i| mesh.weld_group(i))
            .collect::<Vec<_>>();
        assert_eq!(groups.len(), 16);
        // Vertex 4 is the first wall's copy of old vertex 0's position;
        // vertex 6 is that wall's shifted copy, welded to cap vertex 0.
        assert_eq!(mesh.weld_group(6), mesh.weld_group(0));
        assert_eq!(mesh.vertex(4), cap_before[0]);

        assert_eq!(mesh.drain_events(), vec![MeshEvent::TopologyChanged]);
    }

    #[test]
    fn test_extrude_whole_quad_has_four_walls() {
        let mut mesh = MeshModel::plane(2.0);
        let mut sel = SelectionState::new();
        sel.set_selected(MeshEditMode::Face, 0, true);
        sel.set_selected(MeshEditMode::Face, 1, true);

        mesh.do_extrude(&sel);
        // The shared diagonal belongs to 2 selected triangles: interior.
        // 4 outer edges -> 4 walls.
        assert_eq!(mesh.triangle_count(), 2 + 4 * 2);
        assert_eq!(mesh.vertex_count(), 4 + 4 * 4);
        // Whole plane moved up
        for i in 0..4 {
            assert!((mesh.vertex(i).y - EXTRUDE_SHIFT.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_extrude_with_no_selection_is_noop() {
        let mut mesh = MeshModel::plane(2.0);
        let sel = SelectionState::new();
        mesh.do_extrude(&sel);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.drain_events().is_empty());
    }

    #[test]
    fn test_extruded_faces_stay_pickable() {
        let mut mesh = MeshModel::plane(2.0);
        let mut sel = SelectionState::new();
        sel.set_selected(MeshEditMode::Face, 0, true);
        mesh.do_extrude(&sel);

        // The moved cap should now be hit 0.1 higher
        let target = Vec3::new(-0.5, 0.1, -0.1);
        let pick = mesh.find_face(above(target), target, 0.5).unwrap();
        assert_eq!(pick.triangle, 0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.bin");

        let mut mesh = MeshModel::cube(2.0);
        mesh.shift_uv(0, Vec2::new(0.25, 0.0));
        mesh.drain_events();
        mesh.save_to_file(&path).unwrap();

        let loaded = MeshModel::load_from_file(&path).unwrap();
        assert_eq!(loaded.vertex_count(), mesh.vertex_count());
        assert_eq!(loaded.triangle_count(), mesh.triangle_count());
        for i in 0..mesh.vertex_count() {
            assert_eq!(loaded.vertex(i), mesh.vertex(i));
            assert_eq!(loaded.uv(i), mesh.uv(i));
            assert_eq!(loaded.weld_group(i), mesh.weld_group(i));
        }
        assert_eq!(loaded.triangles(), mesh.triangles());
    }

    #[test]
    fn test_load_plain_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ron");

        let mesh = MeshModel::plane(1.0);
        let ron_string =
            ron::ser::to_string_pretty(&mesh, ron::ser::PrettyConfig::default()).unwrap();
        std::fs::write(&path, ron_string).unwrap();

        let loaded = MeshModel::load_from_file(&path).unwrap();
        assert_eq!(loaded.vertex_count(), 4);
        assert_eq!(loaded.edge_count(), 6);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = MeshModel::load_from_file(Path::new("/nonexistent/mesh.bin")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
