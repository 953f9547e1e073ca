//! Selection state for mesh editing
//!
//! Each edit mode keeps its own independent set of selected elements, so
//! switching modes never loses work in progress. Identifiers differ per
//! mode: vertex mode selects vertex indices, face mode selects triangle
//! indices, and edge mode selects corner slots in the index buffer
//! (`triangle_index * 3 + corner`), because a triangle-soup mesh has no
//! shared edge objects to point at.

use std::collections::{HashMap, HashSet};
use serde::{Serialize, Deserialize};

/// Which kind of mesh element the user is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshEditMode {
    Vertex,
    Edge,
    Face,
}

impl MeshEditMode {
    pub const ALL: [MeshEditMode; 3] = [
        MeshEditMode::Vertex,
        MeshEditMode::Edge,
        MeshEditMode::Face,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MeshEditMode::Vertex => "Vertex",
            MeshEditMode::Edge => "Edge",
            MeshEditMode::Face => "Face",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MeshEditMode::Vertex => 0,
            MeshEditMode::Edge => 1,
            MeshEditMode::Face => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// The next mode in cycling order (vertex, edge, face, vertex, ...).
    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// The previous mode in cycling order.
    pub fn prev(&self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }
}

/// Per-mode selection sets, plus a per-triangle corner mask kept in sync
/// with the edge set so a renderer can highlight edges with one lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionState {
    vertices: HashSet<usize>,
    edges: HashSet<usize>,
    faces: HashSet<usize>,
    /// triangle index -> 3-bit mask of selected corners (bit k = corner k)
    corner_masks: HashMap<usize, u8>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, mode: MeshEditMode, index: usize) -> bool {
        match mode {
            MeshEditMode::Vertex => self.vertices.contains(&index),
            MeshEditMode::Edge => self.edges.contains(&index),
            MeshEditMode::Face => self.faces.contains(&index),
        }
    }

    pub fn set_selected(&mut self, mode: MeshEditMode, index: usize, selected: bool) {
        match mode {
            MeshEditMode::Vertex => {
                if selected {
                    self.vertices.insert(index);
                } else {
                    self.vertices.remove(&index);
                }
            }
            MeshEditMode::Edge => {
                if selected {
                    self.edges.insert(index);
                } else {
                    self.edges.remove(&index);
                }
                let tri = index / 3;
                let bit = 1u8 << (index % 3);
                let mask = self.corner_masks.entry(tri).or_insert(0);
                if selected {
                    *mask |= bit;
                } else {
                    *mask &= !bit;
                    if *mask == 0 {
                        self.corner_masks.remove(&tri);
                    }
                }
            }
            MeshEditMode::Face => {
                if selected {
                    self.faces.insert(index);
                } else {
                    self.faces.remove(&index);
                }
            }
        }
    }

    /// Flip the selection of one element.
    pub fn toggle(&mut self, mode: MeshEditMode, index: usize) {
        let now = !self.is_selected(mode, index);
        self.set_selected(mode, index, now);
    }

    /// Clear one mode's selection. Returns true if anything was selected.
    pub fn deselect_all(&mut self, mode: MeshEditMode) -> bool {
        match mode {
            MeshEditMode::Vertex => {
                let had = !self.vertices.is_empty();
                self.vertices.clear();
                had
            }
            MeshEditMode::Edge => {
                let had = !self.edges.is_empty();
                self.edges.clear();
                self.corner_masks.clear();
                had
            }
            MeshEditMode::Face => {
                let had = !self.faces.is_empty();
                self.faces.clear();
                had
            }
        }
    }

    /// Clear everything in every mode.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.corner_masks.clear();
    }

    pub fn count(&self, mode: MeshEditMode) -> usize {
        match mode {
            MeshEditMode::Vertex => self.vertices.len(),
            MeshEditMode::Edge => self.edges.len(),
            MeshEditMode::Face => self.faces.len(),
        }
    }

    /// 3-bit mask of selected edge corners for one triangle.
    pub fn corner_mask(&self, triangle: usize) -> u8 {
        self.corner_masks.get(&triangle).copied().unwrap_or(0)
    }

    pub fn selected(&self, mode: MeshEditMode) -> impl Iterator<Item = usize> + '_ {
        match mode {
            MeshEditMode::Vertex => self.vertices.iter().copied(),
            MeshEditMode::Edge => self.edges.iter().copied(),
            MeshEditMode::Face => self.faces.iter().copied(),
        }
    }
}
