//! Simple event queue for decoupling the mesh model from its consumers
//!
//! The mesh pushes change notifications here; a renderer or collider layer
//! drains them once per frame and refreshes whatever the events name.

/// Change notifications emitted by a mesh model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshEvent {
    /// The UV of a single vertex changed.
    UvChanged(usize),
    /// Vertex positions changed without altering the triangle list.
    GeometryChanged,
    /// Triangles were added or removed; derived data was rebuilt.
    TopologyChanged,
}

/// A queue of events of type T
#[derive(Debug, Clone)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

// Not derived: the derive would require T: Default
impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the queue
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events, consuming them
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
