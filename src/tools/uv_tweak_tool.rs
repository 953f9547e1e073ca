//! UV tweak tool: drag the texture coordinates of a picked vertex
//!
//! On trigger press the tool picks the nearest vertex and captures a drag
//! plane facing the hand. While held, tool-tip motion is projected onto
//! that plane and fed to the mesh as UV deltas, so welded corners on the
//! same UV island follow along.

use crate::math::{Vec2, Vec3, project_to_2d};
use crate::mesh::MeshModel;
use crate::tools::Tool;

const PRESS_THRESHOLD: f32 = 0.6;
const RELEASE_THRESHOLD: f32 = 0.4;
const MAX_PICK_DIST: f32 = 0.2;

/// World-space drag distance mapped to one unit of UV space.
const DRAG_SCALE: f32 = 1.0;

/// One frame of hand input for the UV tool.
#[derive(Debug, Clone, Copy)]
pub struct UvTweakInput {
    pub trigger: f32,
    pub origin: Vec3,
    pub target: Vec3,
}

/// Drags UVs of the vertex under the tool.
#[derive(Debug, Clone, Default)]
pub struct UvTweakTool {
    active: bool,
    trigger_down: bool,
    drag: Option<UvDrag>,
}

#[derive(Debug, Clone, Copy)]
struct UvDrag {
    vertex: usize,
    plane_up: Vec3,
    plane_right: Vec3,
    last: Vec2,
}

impl UvTweakTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn cancel(&mut self) {
        self.drag = None;
    }

    pub fn update(&mut self, input: UvTweakInput, mesh: &mut MeshModel) {
        if !self.active {
            return;
        }

        let pressed = !self.trigger_down && input.trigger > PRESS_THRESHOLD;
        let released = self.trigger_down && input.trigger < RELEASE_THRESHOLD;
        if pressed {
            self.trigger_down = true;
            self.begin_drag(input, mesh);
            return;
        }
        if released {
            self.trigger_down = false;
            self.cancel();
            return;
        }

        let Some(drag) = &mut self.drag else {
            return;
        };
        let current = project_to_2d(drag.plane_up, drag.plane_right, input.target);
        let delta = current - drag.last;
        if delta != Vec2::ZERO {
            mesh.shift_uv(drag.vertex, Vec2::new(delta.x * DRAG_SCALE, delta.y * DRAG_SCALE));
            drag.last = current;
        }
    }

    fn begin_drag(&mut self, input: UvTweakInput, mesh: &MeshModel) {
        let Some(pick) = mesh.find_vertex_index(input.origin, input.target, MAX_PICK_DIST) else {
            return;
        };

        // Drag plane faces the hand. Near-vertical view directions fall
        // back to the world X axis for the right vector.
        let forward = (input.target - input.origin).normalize();
        let mut plane_right = Vec3::UP.cross(forward);
        if plane_right.len() < 1e-4 {
            plane_right = Vec3::new(1.0, 0.0, 0.0);
        }
        let plane_right = plane_right.normalize();
        let plane_up = forward.cross(plane_right).normalize();

        self.drag = Some(UvDrag {
            vertex: pick.index,
            plane_up,
            plane_right,
            last: project_to_2d(plane_up, plane_right, input.target),
        });
    }
}

impl Tool for UvTweakTool {
    fn id(&self) -> &'static str {
        "uv-tweak"
    }

    fn label(&self) -> &'static str {
        "UV Tweak"
    }

    fn active(&self) -> bool {
        self.active
    }

    fn do_activate(&mut self) -> bool {
        self.active = true;
        true
    }

    fn do_deactivate(&mut self) -> bool {
        self.cancel();
        self.trigger_down = false;
        self.active = false;
        true
    }
}
