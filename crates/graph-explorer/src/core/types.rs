//! Core type definitions for the graph explorer
//!
//! This module contains the node and arc entities stored by
//! [`GraphStore`](super::GraphStore), the node display state, and the
//! serializable snapshot types used to move graphs in and out of the core.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Size};

/// Display state of a node
///
/// Only affects interaction and styling; the layout engine treats both
/// states the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Neighbors have been fetched and are shown
    Expanded,
    /// Only the node itself is shown
    #[default]
    Collapsed,
}

impl NodeState {
    pub fn is_expanded(&self) -> bool {
        matches!(self, NodeState::Expanded)
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, NodeState::Collapsed)
    }

    /// The opposite state
    pub fn toggled(&self) -> Self {
        match self {
            NodeState::Expanded => NodeState::Collapsed,
            NodeState::Collapsed => NodeState::Expanded,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Expanded => write!(f, "expanded"),
            NodeState::Collapsed => write!(f, "collapsed"),
        }
    }
}

impl FromStr for NodeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expanded" => Ok(NodeState::Expanded),
            "collapsed" => Ok(NodeState::Collapsed),
            _ => Err(format!("Unknown node state: {}", s)),
        }
    }
}

/// A vertex of the explorer graph
///
/// The id is fixed at construction so that a node held mutably can never
/// drift away from the key it is indexed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    id: String,
    /// Center of the node in viewport pixels
    #[serde(default)]
    pub position: Point,
    /// Measured size of the node's visual element
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub state: NodeState,
    /// Categorical tag used for styling and grouping
    #[serde(default)]
    pub kind: String,
    /// Label text or markup shown inside the node
    #[serde(default)]
    pub content: String,
}

impl NodeData {
    /// Create a collapsed node at the origin
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: Point::ORIGIN,
            size: Size::default(),
            state: NodeState::default(),
            kind: String::new(),
            content: String::new(),
        }
    }

    /// Create a node at a given position
    pub fn at(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(id).with_position(Point::new(x, y))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// A directed arc between two nodes
///
/// Endpoints are assigned by the store when the arc is inserted, so an arc
/// built by a caller carries only its identity and display attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcData {
    id: String,
    source: String,
    destination: String,
    /// Optional label drawn along the arc
    pub label: Option<String>,
    /// Categorical tag used for styling
    pub kind: String,
}

impl ArcData {
    /// Create an unattached arc
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: String::new(),
            destination: String::new(),
            label: None,
            kind: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source node id; empty until the arc is stored
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Destination node id; empty until the arc is stored
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// True if both endpoints are the same node
    pub fn is_self_loop(&self) -> bool {
        self.source == self.destination
    }

    pub(crate) fn attach(&mut self, source: &str, destination: &str) {
        self.source = source.to_string();
        self.destination = destination.to_string();
    }
}

/// Serialized form of an arc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSnapshot {
    pub id: String,
    pub source: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: String,
}

impl From<&ArcData> for ArcSnapshot {
    fn from(arc: &ArcData) -> Self {
        Self {
            id: arc.id.clone(),
            source: arc.source.clone(),
            destination: arc.destination.clone(),
            label: arc.label.clone(),
            kind: arc.kind.clone(),
        }
    }
}

impl ArcSnapshot {
    /// Split into an unattached arc and its endpoints
    pub fn into_parts(self) -> (ArcData, String, String) {
        let arc = ArcData {
            id: self.id,
            source: String::new(),
            destination: String::new(),
            label: self.label,
            kind: self.kind,
        };
        (arc, self.source, self.destination)
    }
}

/// Serialized form of a whole graph, in store order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub arcs: Vec<ArcSnapshot>,
}

impl GraphSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_state_parsing() {
        assert_eq!(NodeState::from_str("expanded"), Ok(NodeState::Expanded));
        assert_eq!(NodeState::from_str("COLLAPSED"), Ok(NodeState::Collapsed));
        assert!(NodeState::from_str("open").is_err());
    }

    #[test]
    fn test_node_state_properties() {
        assert_eq!(NodeState::default(), NodeState::Collapsed);
        assert!(NodeState::Expanded.is_expanded());
        assert!(NodeState::Collapsed.is_collapsed());
        assert_eq!(NodeState::Expanded.toggled(), NodeState::Collapsed);
        assert_eq!(NodeState::Expanded.to_string(), "expanded");
    }

    #[test]
    fn test_node_builders() {
        let node = NodeData::at("A", 10.0, 20.0)
            .with_size(40.0, 20.0)
            .with_state(NodeState::Expanded)
            .with_kind("person")
            .with_content("Alice");

        assert_eq!(node.id(), "A");
        assert_eq!(node.position, Point::new(10.0, 20.0));
        assert_eq!(node.size, Size::new(40.0, 20.0));
        assert!(node.state.is_expanded());
        assert_eq!(node.kind, "person");
        assert_eq!(node.content, "Alice");
    }

    #[test]
    fn test_unattached_arc() {
        let arc = ArcData::new("e1").with_label("knows");
        assert_eq!(arc.id(), "e1");
        assert_eq!(arc.source(), "");
        assert_eq!(arc.label.as_deref(), Some("knows"));
    }

    #[test]
    fn test_snapshot_json_defaults() {
        let json = r#"{
            "nodes": [{"id": "A", "position": {"x": 1.0, "y": 2.0}}, {"id": "B", "state": "expanded"}],
            "arcs": [{"id": "e", "source": "A", "destination": "B"}]
        }"#;
        let snapshot = GraphSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].position, Point::new(1.0, 2.0));
        assert_eq!(snapshot.nodes[1].position, Point::ORIGIN);
        assert!(snapshot.nodes[1].state.is_expanded());

        let (arc, source, destination) = snapshot.arcs[0].clone().into_parts();
        assert_eq!(arc.id(), "e");
        assert_eq!((source.as_str(), destination.as_str()), ("A", "B"));
    }
}
