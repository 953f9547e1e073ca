//! Meshwork core: the engine-independent model behind a VR mesh editor
//!
//! This crate owns the editable mesh (triangle soup with per-corner UVs),
//! its derived weld groups and edge list, ray picking of vertices, edges
//! and faces, per-mode selection state, and the hand tools that drive
//! edits (select/drag tweaking, UV dragging, boundary-edge extrude).
//!
//! Rendering, collision baking and input devices live outside: callers
//! feed mesh-local rays and axis values in, and drain [`MeshEvent`]s to
//! learn what to refresh.
//!
//! # Module Organization
//!
//! - `math` - Vec3, Vec2, segment utilities, plane projection
//! - `ray` - Ray type, ray-triangle and ray-mesh intersection
//! - `weld` - weld-group index over coincident vertices
//! - `event` - queue of mesh change notifications
//! - `mesh` - the editable `MeshModel` and its operations
//! - `selection` - edit modes and per-mode selection state
//! - `tools` - tweak and UV-tweak tools, tool lifecycle

pub mod event;
pub mod math;
pub mod mesh;
pub mod ray;
pub mod selection;
pub mod tools;
pub mod weld;

pub use event::{EventQueue, MeshEvent};
pub use math::{Vec2, Vec3};
pub use mesh::{EdgePick, FacePick, MeshEdge, MeshError, MeshModel, VertexPick, EXTRUDE_SHIFT};
pub use ray::{MeshHit, Ray, TriangleHit, ray_mesh_intersect, ray_triangle_intersect};
pub use selection::{MeshEditMode, SelectionState};
pub use tools::{Tool, ToolRegistry, ToolSet, TweakInput, TweakTool, UvTweakInput, UvTweakTool};
pub use weld::recalc_weld_groups;
