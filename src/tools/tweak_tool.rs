//! Tweak tool: select and drag mesh elements with one hand
//!
//! The tool aims a ray from the hand (`origin`) through the tool tip
//! (`target`). The trigger selects and drags, the modifier button toggles
//! selection membership (and requests an extrude mid-drag), and the
//! thumb stick cycles the edit mode. Analog inputs arrive as raw axis
//! values every frame; edge detection and hysteresis happen here.

use std::collections::BTreeMap;

use crate::math::Vec3;
use crate::mesh::MeshModel;
use crate::selection::{MeshEditMode, SelectionState};
use crate::tools::Tool;

/// Axis value above which a trigger/button counts as pressed.
const PRESS_THRESHOLD: f32 = 0.6;
/// Axis value below which it counts as released. The gap prevents
/// flicker when the analog value hovers near the threshold.
const RELEASE_THRESHOLD: f32 = 0.4;

/// Stick deflection that cycles the edit mode.
const STICK_CYCLE_THRESHOLD: f32 = 0.5;
/// The stick must return inside this band before it can cycle again.
const STICK_CENTER_THRESHOLD: f32 = 0.3;
/// Fractional growth of the grab per update at full stick deflection
/// while dragging.
const SCALE_STEP: f32 = 0.05;

/// How far a pick may land from the tool tip and still count.
const MAX_PICK_DIST: f32 = 0.2;

/// One frame of hand input, in mesh-local space.
#[derive(Debug, Clone, Copy)]
pub struct TweakInput {
    /// Analog trigger, 0..1.
    pub trigger: f32,
    /// Analog modifier button, 0..1.
    pub modifier: f32,
    /// Thumb stick X axis, -1..1.
    pub stick_x: f32,
    /// Hand position (ray origin).
    pub origin: Vec3,
    /// Tool tip position (ray aim point and drag anchor).
    pub target: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    /// Trigger held after hitting an unselected element: sweeping selects.
    Selecting,
    /// Trigger held after modifier-toggling an element off: sweeping deselects.
    Deselecting,
    /// Trigger held after grabbing selected geometry: moving it.
    Dragging,
}

/// Select-and-drag tool for vertices, edges and faces.
#[derive(Debug, Clone)]
pub struct TweakTool {
    active: bool,
    mode: MeshEditMode,
    state: DragState,
    trigger_down: bool,
    modifier_down: bool,
    stick_centered: bool,
    /// Grabbed vertices: index -> offset from the tool tip at grab time.
    grabbed: BTreeMap<usize, Vec3>,
}

impl Default for TweakTool {
    fn default() -> Self {
        Self {
            active: false,
            mode: MeshEditMode::Vertex,
            state: DragState::Idle,
            trigger_down: false,
            modifier_down: false,
            stick_centered: true,
            grabbed: BTreeMap::new(),
        }
    }
}

impl TweakTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> MeshEditMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Abandon any drag or sweep in progress.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        self.grabbed.clear();
    }

    /// Advance one frame.
    pub fn update(
        &mut self,
        input: TweakInput,
        mesh: &mut MeshModel,
        selection: &mut SelectionState,
    ) {
        if !self.active {
            return;
        }

        // While dragging the stick scales the grab instead
        if self.state != DragState::Dragging {
            self.update_mode_cycle(input.stick_x, selection);
        }

        let trigger_pressed = !self.trigger_down && input.trigger > PRESS_THRESHOLD;
        let trigger_released = self.trigger_down && input.trigger < RELEASE_THRESHOLD;
        if trigger_pressed {
            self.trigger_down = true;
        } else if trigger_released {
            self.trigger_down = false;
        }

        let modifier_pressed = !self.modifier_down && input.modifier > PRESS_THRESHOLD;
        if modifier_pressed {
            self.modifier_down = true;
        } else if self.modifier_down && input.modifier < RELEASE_THRESHOLD {
            self.modifier_down = false;
        }

        if trigger_pressed {
            self.begin_press(input, mesh, selection, modifier_pressed || self.modifier_down);
            return;
        }
        if trigger_released {
            self.cancel();
            return;
        }
        if !self.trigger_down {
            return;
        }

        // Trigger held
        match self.state {
            DragState::Selecting => {
                if let Some(hit) = self.pick(input, mesh) {
                    if !selection.is_selected(self.mode, hit) {
                        selection.set_selected(self.mode, hit, true);
                    }
                }
            }
            DragState::Deselecting => {
                if let Some(hit) = self.pick(input, mesh) {
                    if selection.is_selected(self.mode, hit) {
                        selection.set_selected(self.mode, hit, false);
                    }
                }
            }
            DragState::Dragging => {
                if modifier_pressed && self.mode == MeshEditMode::Face {
                    mesh.do_extrude(selection);
                    // The cap just moved; re-anchor the grab to it.
                    self.grab_selection(input.target, mesh, selection);
                }
                if input.stick_x.abs() > STICK_CENTER_THRESHOLD {
                    self.scale_grab(1.0 + input.stick_x * SCALE_STEP);
                }
                self.drag_to(input.target, mesh);
            }
            DragState::Idle => {}
        }
    }

    /// Thumb stick cycles vertex -> edge -> face with a center detent.
    /// Leaving a mode clears that mode's selection.
    fn update_mode_cycle(&mut self, stick_x: f32, selection: &mut SelectionState) {
        if stick_x.abs() < STICK_CENTER_THRESHOLD {
            self.stick_centered = true;
            return;
        }
        if !self.stick_centered || stick_x.abs() < STICK_CYCLE_THRESHOLD {
            return;
        }
        self.stick_centered = false;
        let departed = self.mode;
        self.mode = if stick_x > 0.0 {
            self.mode.next()
        } else {
            self.mode.prev()
        };
        selection.deselect_all(departed);
        self.cancel();
    }

    /// Pick the element under the tool for the current mode. Returns the
    /// mode's selection identifier.
    fn pick(&self, input: TweakInput, mesh: &MeshModel) -> Option<usize> {
        match self.mode {
            MeshEditMode::Vertex => mesh
                .find_vertex_index(input.origin, input.target, MAX_PICK_DIST)
                .map(|p| p.index),
            MeshEditMode::Edge => mesh
                .find_edge(input.origin, input.target, MAX_PICK_DIST)
                .map(|p| p.index),
            MeshEditMode::Face => mesh
                .find_face(input.origin, input.target, MAX_PICK_DIST)
                .map(|p| p.triangle),
        }
    }

    fn begin_press(
        &mut self,
        input: TweakInput,
        mesh: &mut MeshModel,
        selection: &mut SelectionState,
        modifier: bool,
    ) {
        let Some(hit) = self.pick(input, mesh) else {
            // Pressed on nothing: reset this mode's selection
            selection.deselect_all(self.mode);
            self.state = DragState::Idle;
            return;
        };

        if modifier {
            // Toggle membership; keep sweeping in the same direction
            let now = !selection.is_selected(self.mode, hit);
            selection.set_selected(self.mode, hit, now);
            self.state = if now {
                DragState::Selecting
            } else {
                DragState::Deselecting
            };
            return;
        }

        if selection.is_selected(self.mode, hit) {
            // Grab and drag the selected geometry
            match self.mode {
                MeshEditMode::Vertex => {
                    self.grabbed.clear();
                    self.grabbed.insert(hit, mesh.vertex(hit) - input.target);
                    self.state = DragState::Dragging;
                }
                MeshEditMode::Face => {
                    self.grab_selection(input.target, mesh, selection);
                    self.state = DragState::Dragging;
                }
                // Edges have no drag target; the press keeps the selection
                MeshEditMode::Edge => {
                    self.state = DragState::Selecting;
                }
            }
            return;
        }

        // Plain press on an unselected element: restart the selection
        selection.deselect_all(self.mode);
        selection.set_selected(self.mode, hit, true);
        self.state = DragState::Selecting;
    }

    /// Grow or shrink the grabbed geometry about the tool tip.
    fn scale_grab(&mut self, factor: f32) {
        for offset in self.grabbed.values_mut() {
            *offset = *offset * factor;
        }
    }

    /// Record offsets from the tool tip for every selection vertex.
    fn grab_selection(&mut self, target: Vec3, mesh: &MeshModel, selection: &SelectionState) {
        self.grabbed.clear();
        for (idx, pos) in mesh.find_selection_vertices(self.mode, selection) {
            self.grabbed.insert(idx, pos - target);
        }
    }

    /// Re-target every grabbed vertex, deferring the derived-data
    /// notification to the last shift.
    fn drag_to(&mut self, target: Vec3, mesh: &mut MeshModel) {
        let count = self.grabbed.len();
        for (n, (&idx, &offset)) in self.grabbed.iter().enumerate() {
            mesh.shift_vertex_to(idx, target + offset, n + 1 == count);
        }
    }
}

impl Tool for TweakTool {
    fn id(&self) -> &'static str {
        "tweak"
    }

    fn label(&self) -> &'static str {
        "Tweak"
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
        self.modifier_down = false;
        self.active = false;
        true
    }
}
