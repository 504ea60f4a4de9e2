//! Core layout trait for node positioning
//!
//! A layout algorithm reads the store's topology and current positions and
//! writes new positions for every node that is not locked.

use std::collections::HashSet;

use super::geometry::Viewport;
use super::store::GraphStore;

/// Core trait for layout algorithms
///
/// `layout` runs to completion before returning; no intermediate positions
/// are ever visible to other callers.
///
/// # Example
/// ```
/// use std::collections::HashSet;
/// use graph_explorer::core::{GraphStore, LayoutAlgorithm, NodeData, Viewport};
/// use graph_explorer::layout::ForceDirectedLayout;
///
/// let mut store = GraphStore::new();
/// store.add_node(NodeData::at("A", 10.0, 10.0)).unwrap();
///
/// let engine = ForceDirectedLayout::new();
/// let report = engine.layout(&mut store, Viewport::new(200.0, 200.0), &HashSet::new());
/// assert!(report.converged);
/// ```
pub trait LayoutAlgorithm: Send + Sync {
    /// Reposition every unlocked node inside `viewport`.
    ///
    /// Locked ids that are not in the store are ignored.
    fn layout(
        &self,
        store: &mut GraphStore,
        viewport: Viewport,
        locked: &HashSet<String>,
    ) -> LayoutReport;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}

/// Outcome of a layout pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutReport {
    /// Force iterations actually run
    pub iterations: usize,
    /// Number of nodes the pass was allowed to move
    pub movable: usize,
    /// Largest pending per-node step at the last force evaluation, in pixels
    pub max_displacement: f64,
    /// Stopped because the largest pending step fell below the threshold
    pub converged: bool,
}

impl LayoutReport {
    /// Report for a pass that had nothing to do
    pub fn idle() -> Self {
        Self {
            iterations: 0,
            movable: 0,
            max_displacement: 0.0,
            converged: true,
        }
    }
}
