//! Hand tools for mesh editing
//!
//! Tools have an activation lifecycle (activate/deactivate with
//! success/failure) and identity (id, label) for UI and serialization.
//! Only the active tool receives per-frame input. A `ToolSet` holds one
//! tool of each kind and enforces that at most one is active, cancelling
//! any drag in progress when switching.

mod tweak_tool;
mod uv_tweak_tool;

pub use tweak_tool::{TweakInput, TweakTool};
pub use uv_tweak_tool::{UvTweakInput, UvTweakTool};

/// Base trait for all tools
///
/// # Lifecycle
///
/// ```text
/// [Inactive] --activate()--> [Active] --deactivate()--> [Inactive]
///                ^                          |
///                |     (can fail)           |
///                +--------------------------+
/// ```
pub trait Tool {
    /// Unique identifier for this tool (e.g., "tweak", "uv-tweak")
    fn id(&self) -> &'static str;

    /// Human-readable label
    fn label(&self) -> &'static str;

    /// Whether this tool is currently active
    fn active(&self) -> bool;

    /// Attempt to activate the tool.
    ///
    /// Return `true` if activation succeeded, `false` if preconditions
    /// were not met. Override `do_activate()` for custom logic.
    fn activate(&mut self) -> bool {
        if self.active() {
            return false; // Already active
        }
        self.do_activate()
    }

    /// Attempt to deactivate the tool.
    ///
    /// Override `do_deactivate()` for custom cleanup (cancelling drags,
    /// dropping grabbed state).
    fn deactivate(&mut self) -> bool {
        if !self.active() {
            return false; // Already inactive
        }
        self.do_deactivate()
    }

    /// Internal activation logic - override this in implementations.
    fn do_activate(&mut self) -> bool {
        true
    }

    /// Internal deactivation logic - override this in implementations.
    fn do_deactivate(&mut self) -> bool {
        true
    }
}

/// Trait for accessing tools by ID
pub trait ToolRegistry {
    fn get_tool_mut(&mut self, id: &str) -> Option<&mut dyn Tool>;
    fn get_tool(&self, id: &str) -> Option<&dyn Tool>;
    fn tool_ids(&self) -> Vec<&'static str>;
}

/// One of each editing tool, at most one active at a time.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    pub tweak: TweakTool,
    pub uv_tweak: UvTweakTool,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the named tool, deactivating whichever was active first.
    /// Returns false if the id is unknown or activation was refused.
    pub fn activate_tool(&mut self, id: &str) -> bool {
        if self.get_tool(id).is_none() {
            return false;
        }
        for other in self.tool_ids() {
            if other != id {
                if let Some(tool) = self.get_tool_mut(other) {
                    if tool.active() {
                        tool.deactivate();
                    }
                }
            }
        }
        match self.get_tool_mut(id) {
            Some(tool) if !tool.active() => tool.activate(),
            Some(_) => true, // already active
            None => false,
        }
    }

    /// The id of the active tool, if any.
    pub fn active_tool(&self) -> Option<&'static str> {
        self.tool_ids()
            .into_iter()
            .find(|id| self.get_tool(id).map_or(false, |t| t.active()))
    }
}

impl ToolRegistry for ToolSet {
    fn get_tool_mut(&mut self, id: &str) -> Option<&mut dyn Tool> {
        match id {
            "tweak" => Some(&mut self.tweak),
            "uv-tweak" => Some(&mut self.uv_tweak),
            _ => None,
        }
    }

    fn get_tool(&self, id: &str) -> Option<&dyn Tool> {
        match id {
            "tweak" => Some(&self.tweak),
            "uv-tweak" => Some(&self.uv_tweak),
            _ => None,
        }
    }

    fn tool_ids(&self) -> Vec<&'static str> {
        vec!["tweak", "uv-tweak"]
    }
}
