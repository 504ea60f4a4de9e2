//! Change notifications for the presentation layer
//!
//! The core never depends on what a listener does with a notification; it
//! only promises to send one whenever it changes a node or arc.

use super::types::{ArcData, NodeData};

/// Receives a call every time the core changes an entity.
///
/// Implementations usually schedule a re-render of the matching visual
/// element.
pub trait UpdateListener {
    /// A node's position, size, state or content changed
    fn node_updated(&self, node: &NodeData);

    /// An arc changed, or one of its endpoints moved
    fn arc_updated(&self, arc: &ArcData);

    /// A node left the graph
    fn node_removed(&self, _node: &NodeData) {}

    /// An arc left the graph
    fn arc_removed(&self, _arc: &ArcData) {}
}

/// Listener that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl UpdateListener for NoopListener {
    fn node_updated(&self, _node: &NodeData) {}

    fn arc_updated(&self, _arc: &ArcData) {}
}

/// Listener that records notified ids, for tests and headless callers
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: std::cell::RefCell<Vec<UpdateEvent>>,
}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    NodeUpdated(String),
    ArcUpdated(String),
    NodeRemoved(String),
    ArcRemoved(String),
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far
    pub fn take(&self) -> Vec<UpdateEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl UpdateListener for RecordingListener {
    fn node_updated(&self, node: &NodeData) {
        self.events
            .borrow_mut()
            .push(UpdateEvent::NodeUpdated(node.id().to_string()));
    }

    fn arc_updated(&self, arc: &ArcData) {
        self.events
            .borrow_mut()
            .push(UpdateEvent::ArcUpdated(arc.id().to_string()));
    }

    fn node_removed(&self, node: &NodeData) {
        self.events
            .borrow_mut()
            .push(UpdateEvent::NodeRemoved(node.id().to_string()));
    }

    fn arc_removed(&self, arc: &ArcData) {
        self.events
            .borrow_mut()
            .push(UpdateEvent::ArcRemoved(arc.id().to_string()));
    }
}

impl<L: UpdateListener + ?Sized> UpdateListener for std::rc::Rc<L> {
    fn node_updated(&self, node: &NodeData) {
        (**self).node_updated(node)
    }

    fn arc_updated(&self, arc: &ArcData) {
        (**self).arc_updated(arc)
    }

    fn node_removed(&self, node: &NodeData) {
        (**self).node_removed(node)
    }

    fn arc_removed(&self, arc: &ArcData) {
        (**self).arc_removed(arc)
    }
}
