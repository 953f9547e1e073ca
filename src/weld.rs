//! Weld groups: equivalence classes of vertices at identical positions
//!
//! Triangle-soup meshes duplicate a vertex once per face corner so each
//! corner can carry its own UV. Editing operations still need to treat
//! coincident copies as one logical vertex, so every vertex gets a weld
//! group id: the lowest vertex index among all vertices at exactly the
//! same position. Comparison is exact, not epsilon-based; copies come from
//! duplication, so their floats are bit-identical.

use crate::math::Vec3;

/// Compute the weld group id for every vertex.
///
/// `groups[i]` is the smallest index j with `vertices[j] == vertices[i]`.
/// A vertex with no coincident copies is its own group. Quadratic in the
/// vertex count, which is fine at hand-editing scale.
pub fn recalc_weld_groups(vertices: &[Vec3]) -> Vec<usize> {
    let mut groups: Vec<Option<usize>> = vec![None; vertices.len()];
    for i in 0..vertices.len() {
        if groups[i].is_some() {
            continue;
        }
        groups[i] = Some(i);
        for j in (i + 1)..vertices.len() {
            if groups[j].is_none() && vertices[j] == vertices[i] {
                groups[j] = Some(i);
            }
        }
    }
    groups.into_iter().map(|g| g.unwrap_or(0)).collect()
}

/// All vertex indices sharing a weld group with `index` (including `index`).
pub fn welded_vertices(groups: &[usize], index: usize) -> Vec<usize> {
    let group = groups[index];
    (0..groups.len()).filter(|&i| groups[i] == group).collect()
}
