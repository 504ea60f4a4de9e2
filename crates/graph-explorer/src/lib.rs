//! Graph Explorer - the model behind an interactive graph-exploration widget
//!
//! A directed multigraph of positioned nodes and identified arcs, plus a
//! force-directed layout engine that keeps every node inside the visible
//! viewport.
//!
//! # Quick Start
//!
//! ```rust
//! use graph_explorer::{ArcData, GraphModel, NodeData};
//!
//! let mut model = GraphModel::new();
//! model.add_node(NodeData::at("A", 0.0, 0.0)).unwrap();
//! model.add_node(NodeData::at("B", 100.0, 0.0)).unwrap();
//! model.add_arc(ArcData::new("A->B"), "A", "B").unwrap();
//!
//! let report = model.layout(200.0, 200.0, ["A"]);
//! assert!(report.iterations > 0);
//!
//! let a = model.get_node("A").unwrap().position;
//! let b = model.get_node("B").unwrap().position;
//! assert_eq!(a.x, 0.0);
//! assert!((a.distance(b) - 120.0).abs() < 1.0);
//! ```
//!
//! # Working with the store directly
//!
//! ```rust
//! use graph_explorer::prelude::*;
//!
//! let mut store = GraphStore::new();
//! store.add_node(NodeData::new("hub")).unwrap();
//! store.add_node(NodeData::new("leaf")).unwrap();
//! store.add_arc(ArcData::new("e1"), "hub", "leaf").unwrap();
//! store.add_arc(ArcData::new("e2"), "hub", "leaf").unwrap();
//!
//! assert_eq!(store.degree("hub"), 2);
//!
//! let removed = store.remove_node("leaf").unwrap();
//! assert_eq!(removed.arcs.len(), 2);
//! assert_eq!(store.arc_count(), 0);
//! ```

pub mod core;
pub mod layout;
pub mod model;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use crate::core::*;
pub use layout::{ForceConfig, ForceDirectedLayout};
pub use model::GraphModel;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        ArcData, GraphError, GraphSnapshot, GraphStore, LayoutAlgorithm, LayoutReport, NodeData,
        NodeState, Point, Size, UpdateListener, Viewport,
    };
    pub use crate::layout::{ForceConfig, ForceDirectedLayout};
    pub use crate::model::GraphModel;
}

/// Lay out a graph snapshot and return the repositioned snapshot
///
/// Convenience for batch callers such as the CLI: load, run one pass with
/// the given engine configuration, and hand back the result.
///
/// # Example
/// ```rust
/// use graph_explorer::{layout_snapshot, ForceConfig, GraphSnapshot};
///
/// let json = r#"{"nodes":[{"id":"A","position":{"x":500.0,"y":5.0}}],"arcs":[]}"#;
/// let snapshot = GraphSnapshot::from_json(json).unwrap();
///
/// let (laid_out, report) =
///     layout_snapshot(snapshot, 100.0, 100.0, &[], ForceConfig::default()).unwrap();
/// assert_eq!(laid_out.nodes[0].position.x, 100.0);
/// assert!(report.converged);
/// ```
pub fn layout_snapshot(
    snapshot: GraphSnapshot,
    width: f64,
    height: f64,
    locked: &[String],
    config: ForceConfig,
) -> Result<(GraphSnapshot, LayoutReport), GraphError> {
    let viewport = Viewport::new(width, height);
    if !viewport.is_valid() {
        return Err(GraphError::InvalidViewport { width, height });
    }

    let mut model = GraphModel::with_engine(ForceDirectedLayout::with_config(config));
    model.load(snapshot)?;
    let report = model.layout(width, height, locked);
    Ok((model.snapshot(), report))
}
