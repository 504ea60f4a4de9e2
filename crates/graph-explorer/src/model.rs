//! Graph model facade
//!
//! [`GraphModel`] is what a controller talks to: it owns the
//! [`GraphStore`], runs the layout engine on request, applies the
//! expand/collapse and drag behaviors of the explorer, and tells the
//! registered [`UpdateListener`] about every entity it touches.

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::{debug, info_span, trace};

use crate::core::{
    ArcData, GraphError, GraphSnapshot, GraphStore, LayoutAlgorithm, LayoutReport, NodeData,
    NodeState, NoopListener, Point, RemovedNode, Size, UpdateListener, Viewport,
};
use crate::layout::ForceDirectedLayout;

/// Store, layout engine and change listener behind one API
pub struct GraphModel {
    store: GraphStore,
    engine: Box<dyn LayoutAlgorithm>,
    listener: Box<dyn UpdateListener>,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphModel")
            .field("store", &self.store)
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl GraphModel {
    /// Empty model with the default force-directed engine
    pub fn new() -> Self {
        Self::with_engine(ForceDirectedLayout::new())
    }

    pub fn with_engine(engine: impl LayoutAlgorithm + 'static) -> Self {
        Self {
            store: GraphStore::new(),
            engine: Box::new(engine),
            listener: Box::new(NoopListener),
        }
    }

    /// Replace the graph with the contents of a snapshot.
    ///
    /// On success the listener hears a removal for every old arc and node,
    /// then an update for every new node and arc. A snapshot that fails to
    /// load leaves the current graph untouched and notifies nothing.
    pub fn load(&mut self, snapshot: GraphSnapshot) -> Result<(), GraphError> {
        let store = GraphStore::from_snapshot(snapshot)?;
        let previous = std::mem::replace(&mut self.store, store);
        debug!(
            removed = previous.node_count(),
            loaded = self.store.node_count(),
            "Loaded snapshot"
        );

        for arc in previous.arcs() {
            self.listener.arc_removed(arc);
        }
        for node in previous.nodes() {
            self.listener.node_removed(node);
        }
        for node in self.store.nodes() {
            self.listener.node_updated(node);
        }
        for arc in self.store.arcs() {
            self.listener.arc_updated(arc);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.snapshot()
    }

    pub fn set_listener(&mut self, listener: impl UpdateListener + 'static) {
        self.listener = Box::new(listener);
    }

    /// Read-only view of the underlying store
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn engine(&self) -> &dyn LayoutAlgorithm {
        self.engine.as_ref()
    }

    // Mutation

    pub fn add_node(&mut self, node: NodeData) -> Result<(), GraphError> {
        let id = node.id().to_string();
        self.store.add_node(node)?;
        self.notify_node(&id);
        Ok(())
    }

    pub fn add_arc(
        &mut self,
        arc: ArcData,
        source: &str,
        destination: &str,
    ) -> Result<(), GraphError> {
        let id = arc.id().to_string();
        self.store.add_arc(arc, source, destination)?;
        if let Some(arc) = self.store.get_arc(&id) {
            self.listener.arc_updated(arc);
        }
        Ok(())
    }

    /// Remove a node and every arc touching it
    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode, GraphError> {
        let removed = self.store.remove_node(id)?;
        for arc in &removed.arcs {
            self.listener.arc_removed(arc);
        }
        self.listener.node_removed(&removed.node);
        Ok(removed)
    }

    /// Remove an arc; `None` if it was not present
    pub fn remove_arc(&mut self, id: &str) -> Option<ArcData> {
        let arc = self.store.remove_arc(id)?;
        self.listener.arc_removed(&arc);
        Some(arc)
    }

    // Queries

    pub fn contains_node(&self, id: &str) -> bool {
        self.store.contains_node(id)
    }

    pub fn contains_arc(&self, id: &str) -> bool {
        self.store.contains_arc(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&NodeData> {
        self.store.get_node(id)
    }

    pub fn get_arc(&self, id: &str) -> Option<&ArcData> {
        self.store.get_arc(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.store.nodes()
    }

    pub fn arcs(&self) -> impl Iterator<Item = &ArcData> {
        self.store.arcs()
    }

    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.store.arc_count()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.store.degree(id)
    }

    pub fn neighbors(&self, id: &str) -> Vec<&NodeData> {
        self.store.neighbors(id)
    }

    pub fn source(&self, arc_id: &str) -> Option<&NodeData> {
        self.store.source(arc_id)
    }

    pub fn destination(&self, arc_id: &str) -> Option<&NodeData> {
        self.store.destination(arc_id)
    }

    // Layout

    /// Run one layout pass over a `width` x `height` viewport.
    ///
    /// Nodes named in `locked` keep their positions; names that are not in
    /// the graph are ignored. Every node that moved is notified, along with
    /// its arcs.
    pub fn layout<I, S>(&mut self, width: f64, height: f64, locked: I) -> LayoutReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let locked: HashSet<String> = locked
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let before: Vec<Point> = self.store.nodes().map(|node| node.position).collect();
        let report = self
            .engine
            .layout(&mut self.store, Viewport::new(width, height), &locked);

        let moved: Vec<String> = self
            .store
            .nodes()
            .zip(&before)
            .filter(|(node, old)| node.position != **old)
            .map(|(node, _)| node.id().to_string())
            .collect();
        debug!(moved = moved.len(), "Notifying moved nodes");

        let mut touched_arcs: IndexSet<String> = IndexSet::new();
        for id in &moved {
            if let Some(node) = self.store.get_node(id) {
                self.listener.node_updated(node);
            }
            for arc in self.store.incident_arcs(id) {
                touched_arcs.insert(arc.id().to_string());
            }
        }
        for arc_id in &touched_arcs {
            if let Some(arc) = self.store.get_arc(arc_id) {
                self.listener.arc_updated(arc);
            }
        }

        report
    }

    // Interaction

    /// Place a node where the user dropped it, kept inside the viewport.
    ///
    /// Returns the position actually applied.
    pub fn move_node(
        &mut self,
        id: &str,
        position: Point,
        viewport: Viewport,
    ) -> Result<Point, GraphError> {
        if !viewport.is_valid() {
            return Err(GraphError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let node = self
            .store
            .get_node_mut(id)
            .ok_or_else(|| GraphError::node_not_found(id))?;
        let clamped = viewport.clamp_center(position, node.size);
        trace!(node_id = id, x = clamped.x, y = clamped.y, "Moving node");
        node.position = clamped;
        self.notify_node(id);
        Ok(clamped)
    }

    /// Record the measured size of a node's visual element
    pub fn set_size(&mut self, id: &str, size: Size) -> Result<(), GraphError> {
        self.update_node(id, |node| node.size = size)
    }

    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> Result<(), GraphError> {
        let content = content.into();
        self.update_node(id, move |node| node.content = content)
    }

    /// Change the label drawn on an arc
    pub fn set_label(&mut self, id: &str, label: Option<String>) -> Result<(), GraphError> {
        let arc = self
            .store
            .get_arc_mut(id)
            .ok_or_else(|| GraphError::arc_not_found(id))?;
        arc.label = label;
        self.listener.arc_updated(arc);
        Ok(())
    }

    /// Mark a node as expanded
    pub fn expand(&mut self, id: &str) -> Result<(), GraphError> {
        self.update_node(id, |node| node.state = NodeState::Expanded)
    }

    /// Expand a collapsed node, or collapse an expanded one.
    ///
    /// Returns the ids pruned by a collapse; expanding prunes nothing.
    pub fn toggle(&mut self, id: &str) -> Result<Vec<String>, GraphError> {
        let state = self
            .store
            .get_node(id)
            .ok_or_else(|| GraphError::node_not_found(id))?
            .state;
        match state.toggled() {
            NodeState::Expanded => {
                self.expand(id)?;
                Ok(Vec::new())
            }
            NodeState::Collapsed => self.collapse(id),
        }
    }

    /// Collapse an expanded node and prune the leaves hanging off it.
    ///
    /// Neighbors that are collapsed and have degree 1 are removed along
    /// with their arc. Returns the removed ids; collapsing a node that is
    /// already collapsed removes nothing.
    pub fn collapse(&mut self, id: &str) -> Result<Vec<String>, GraphError> {
        let span = info_span!("collapse", node_id = id);
        let _enter = span.enter();

        let node = self
            .store
            .get_node_mut(id)
            .ok_or_else(|| GraphError::node_not_found(id))?;
        if !node.state.is_expanded() {
            trace!("Node already collapsed");
            return Ok(Vec::new());
        }
        node.state = NodeState::Collapsed;

        let leaves: Vec<String> = self
            .store
            .neighbors(id)
            .into_iter()
            .filter(|neighbor| neighbor.id() != id)
            .filter(|neighbor| neighbor.state.is_collapsed())
            .filter(|neighbor| self.store.degree(neighbor.id()) == 1)
            .map(|neighbor| neighbor.id().to_string())
            .collect();

        for leaf in &leaves {
            self.remove_node(leaf)?;
        }
        debug!(removed = leaves.len(), "Collapsed node");

        self.notify_node(id);
        Ok(leaves)
    }

    fn update_node(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut NodeData),
    ) -> Result<(), GraphError> {
        let node = self
            .store
            .get_node_mut(id)
            .ok_or_else(|| GraphError::node_not_found(id))?;
        update(node);
        self.notify_node(id);
        Ok(())
    }

    /// Tell the listener about a node and every arc touching it
    fn notify_node(&self, id: &str) {
        if let Some(node) = self.store.get_node(id) {
            self.listener.node_updated(node);
        }
        for arc in self.store.incident_arcs(id) {
            self.listener.arc_updated(arc);
        }
    }
}
