//! Graph store: a directed multigraph with id indexes
//!
//! The store owns three representations that must always agree:
//!
//! - the node index (`id -> NodeData`),
//! - the arc index (`id -> ArcData`, endpoints included),
//! - the adjacency index (`node id -> incident arc ids`).
//!
//! Every public mutation validates all of its preconditions before touching
//! any of the three maps, so a rejected call leaves the store untouched.
//! Iteration follows insertion order, which keeps layout passes
//! reproducible.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::error::GraphError;
use super::types::{ArcData, ArcSnapshot, GraphSnapshot, NodeData};

/// Incident arcs of a single vertex
#[derive(Debug, Clone, Default)]
struct Incidence {
    incoming: IndexSet<String>,
    outgoing: IndexSet<String>,
    /// Arcs present in both sets
    self_loops: usize,
}

impl Incidence {
    fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len() - self.self_loops
    }
}

/// A node removed from the store, with the arcs that went with it
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: NodeData,
    pub arcs: Vec<ArcData>,
}

/// Directed multigraph with O(1) id lookup for nodes and arcs
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: IndexMap<String, NodeData>,
    arcs: IndexMap<String, ArcData>,
    adjacency: IndexMap<String, Incidence>,
}

impl GraphStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    ///
    /// Fails with [`GraphError::DuplicateNode`] if the id is taken.
    pub fn add_node(&mut self, node: NodeData) -> Result<(), GraphError> {
        trace!(node_id = %node.id(), node_kind = %node.kind, "Adding node to store");
        if self.nodes.contains_key(node.id()) {
            debug!(node_id = %node.id(), "Rejected duplicate node");
            return Err(GraphError::duplicate_node(node.id()));
        }

        let id = node.id().to_string();
        self.adjacency.insert(id.clone(), Incidence::default());
        self.nodes.insert(id, node);
        debug!(node_count = self.node_count(), "Node added");
        Ok(())
    }

    /// Insert a directed arc `source -> destination`.
    ///
    /// Both endpoints must already be stored and the arc id must be free.
    /// Several arcs may join the same ordered pair.
    pub fn add_arc(
        &mut self,
        mut arc: ArcData,
        source: &str,
        destination: &str,
    ) -> Result<(), GraphError> {
        trace!(arc_id = %arc.id(), source, destination, "Adding arc to store");
        if self.arcs.contains_key(arc.id()) {
            debug!(arc_id = %arc.id(), "Rejected duplicate arc");
            return Err(GraphError::duplicate_arc(arc.id()));
        }
        for endpoint in [source, destination] {
            if !self.nodes.contains_key(endpoint) {
                debug!(arc_id = %arc.id(), endpoint, "Rejected arc with missing endpoint");
                return Err(GraphError::missing_endpoint(arc.id(), endpoint));
            }
        }

        let id = arc.id().to_string();
        arc.attach(source, destination);

        if let Some(incidence) = self.adjacency.get_mut(source) {
            incidence.outgoing.insert(id.clone());
        }
        if let Some(incidence) = self.adjacency.get_mut(destination) {
            incidence.incoming.insert(id.clone());
            if source == destination {
                incidence.self_loops += 1;
            }
        }
        self.arcs.insert(id, arc);
        debug!(arc_count = self.arc_count(), "Arc added");
        Ok(())
    }

    /// Remove an arc. Returns `None` if no arc has this id.
    pub fn remove_arc(&mut self, id: &str) -> Option<ArcData> {
        let arc = self.arcs.shift_remove(id)?;
        trace!(arc_id = id, "Removing arc from store");

        if let Some(incidence) = self.adjacency.get_mut(arc.source()) {
            incidence.outgoing.shift_remove(id);
        }
        if let Some(incidence) = self.adjacency.get_mut(arc.destination()) {
            incidence.incoming.shift_remove(id);
            if arc.is_self_loop() {
                incidence.self_loops -= 1;
            }
        }
        debug!(arc_count = self.arc_count(), "Arc removed");
        Some(arc)
    }

    /// Remove a node, cascading to every arc incident to it.
    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode, GraphError> {
        let arc_ids: Vec<String> = match self.adjacency.get(id) {
            Some(incidence) => incidence
                .incoming
                .iter()
                .chain(incidence.outgoing.iter())
                .cloned()
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect(),
            None => return Err(GraphError::node_not_found(id)),
        };
        trace!(node_id = id, cascade = arc_ids.len(), "Removing node from store");

        let arcs: Vec<ArcData> = arc_ids
            .iter()
            .filter_map(|arc_id| self.remove_arc(arc_id))
            .collect();

        self.adjacency.shift_remove(id);
        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| GraphError::node_not_found(id))?;

        debug!(
            node_count = self.node_count(),
            arc_count = self.arc_count(),
            "Node removed"
        );
        Ok(RemovedNode { node, arcs })
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_arc(&self, id: &str) -> bool {
        self.arcs.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's attributes (its id cannot change)
    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    pub fn get_arc(&self, id: &str) -> Option<&ArcData> {
        self.arcs.get(id)
    }

    /// Mutable access to an arc's attributes (id and endpoints cannot change)
    pub fn get_arc_mut(&mut self, id: &str) -> Option<&mut ArcData> {
        self.arcs.get_mut(id)
    }

    /// Iterate over all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut NodeData> {
        self.nodes.values_mut()
    }

    /// Iterate over all arcs in insertion order
    pub fn arcs(&self) -> impl Iterator<Item = &ArcData> {
        self.arcs.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Position of a node in iteration order
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct arcs incident to a node; a self-loop counts once.
    ///
    /// Unknown ids have degree 0.
    pub fn degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, Incidence::degree)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, |i| i.incoming.len())
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, |i| i.outgoing.len())
    }

    /// Distinct nodes joined to `id` by an arc in either direction.
    ///
    /// A node with a self-loop is its own neighbor.
    pub fn neighbors(&self, id: &str) -> Vec<&NodeData> {
        let Some(incidence) = self.adjacency.get(id) else {
            return Vec::new();
        };

        let mut seen: IndexSet<&str> = IndexSet::new();
        for arc_id in &incidence.incoming {
            if let Some(arc) = self.arcs.get(arc_id) {
                seen.insert(arc.source());
            }
        }
        for arc_id in &incidence.outgoing {
            if let Some(arc) = self.arcs.get(arc_id) {
                seen.insert(arc.destination());
            }
        }
        seen.into_iter()
            .filter_map(|neighbor| self.nodes.get(neighbor))
            .collect()
    }

    /// Arcs ending at a node
    pub fn in_arcs(&self, id: &str) -> Vec<&ArcData> {
        self.adjacency.get(id).map_or_else(Vec::new, |i| {
            i.incoming.iter().filter_map(|a| self.arcs.get(a)).collect()
        })
    }

    /// Arcs starting at a node
    pub fn out_arcs(&self, id: &str) -> Vec<&ArcData> {
        self.adjacency.get(id).map_or_else(Vec::new, |i| {
            i.outgoing.iter().filter_map(|a| self.arcs.get(a)).collect()
        })
    }

    /// Distinct arcs touching a node, incoming first
    pub fn incident_arcs(&self, id: &str) -> Vec<&ArcData> {
        let mut arcs = self.in_arcs(id);
        arcs.extend(
            self.out_arcs(id)
                .into_iter()
                .filter(|arc| !arc.is_self_loop()),
        );
        arcs
    }

    /// Source node of an arc
    pub fn source(&self, arc_id: &str) -> Option<&NodeData> {
        self.arcs
            .get(arc_id)
            .and_then(|arc| self.nodes.get(arc.source()))
    }

    /// Destination node of an arc
    pub fn destination(&self, arc_id: &str) -> Option<&NodeData> {
        self.arcs
            .get(arc_id)
            .and_then(|arc| self.nodes.get(arc.destination()))
    }

    /// Check that the three representations agree.
    ///
    /// Mutations keep this true by construction; the check exists for tests
    /// and diagnostics.
    pub fn is_consistent(&self) -> bool {
        if self.nodes.len() != self.adjacency.len()
            || !self.nodes.keys().all(|id| self.adjacency.contains_key(id))
        {
            return false;
        }

        let arcs_consistent = self.arcs.iter().all(|(id, arc)| {
            let out_ok = self
                .adjacency
                .get(arc.source())
                .is_some_and(|i| i.outgoing.contains(id));
            let in_ok = self
                .adjacency
                .get(arc.destination())
                .is_some_and(|i| i.incoming.contains(id));
            arc.id() == id && out_ok && in_ok
        });

        let adjacency_consistent = self.adjacency.values().all(|incidence| {
            let loops = incidence
                .incoming
                .iter()
                .filter(|a| incidence.outgoing.contains(*a))
                .count();
            loops == incidence.self_loops
                && incidence
                    .incoming
                    .iter()
                    .chain(incidence.outgoing.iter())
                    .all(|a| self.arcs.contains_key(a))
        });

        let nodes_consistent = self.nodes.iter().all(|(id, node)| node.id() == id);
        let edge_total: usize = self.adjacency.values().map(|i| i.outgoing.len()).sum();

        arcs_consistent && adjacency_consistent && nodes_consistent && edge_total == self.arcs.len()
    }

    /// Serializable copy of the graph in store order
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            arcs: self.arcs.values().map(ArcSnapshot::from).collect(),
        }
    }

    /// Build a store from a snapshot.
    ///
    /// The first invalid node or arc aborts the whole load.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut store = Self::new();
        for node in snapshot.nodes {
            store.add_node(node)?;
        }
        for arc in snapshot.arcs {
            let (arc, source, destination) = arc.into_parts();
            store.add_arc(arc, &source, &destination)?;
        }
        debug!(
            node_count = store.node_count(),
            arc_count = store.arc_count(),
            "Store loaded from snapshot"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(nodes: Vec<&'a NodeData>) -> Vec<&'a str> {
        nodes.into_iter().map(NodeData::id).collect()
    }

    fn abc() -> GraphStore {
        let mut store = GraphStore::new();
        for id in ["A", "B", "C"] {
            store.add_node(NodeData::new(id)).unwrap();
        }
        store
    }

    #[test]
    fn test_add_and_lookup() {
        let mut store = abc();
        store.add_arc(ArcData::new("ab"), "A", "B").unwrap();

        assert!(store.contains_node("A"));
        assert!(store.contains_arc("ab"));
        assert!(!store.contains_node("Z"));
        assert!(store.get_node("Z").is_none());
        assert_eq!(store.get_arc("ab").unwrap().source(), "A");
        assert_eq!(store.source("ab").unwrap().id(), "A");
        assert_eq!(store.destination("ab").unwrap().id(), "B");
        assert!(store.source("missing").is_none());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_degree_and_neighbors() {
        let mut store = abc();
        store.add_arc(ArcData::new("ab"), "A", "B").unwrap();
        store.add_arc(ArcData::new("ac"), "A", "C").unwrap();

        assert_eq!(store.degree("A"), 2);
        assert_eq!(store.degree("B"), 1);
        assert_eq!(store.out_degree("A"), 2);
        assert_eq!(store.in_degree("A"), 0);
        assert_eq!(ids(store.neighbors("A")), vec!["B", "C"]);
        assert_eq!(ids(store.neighbors("B")), vec!["A"]);
        assert_eq!(store.degree("Z"), 0);
        assert!(store.neighbors("Z").is_empty());
    }

    #[test]
    fn test_parallel_arcs() {
        let mut store = abc();
        store.add_arc(ArcData::new("ab1"), "A", "B").unwrap();
        store.add_arc(ArcData::new("ab2"), "A", "B").unwrap();
        store.add_arc(ArcData::new("ba"), "B", "A").unwrap();

        assert_eq!(store.arc_count(), 3);
        assert_eq!(store.degree("A"), 3);
        assert_eq!(ids(store.neighbors("A")), vec!["B"]);
        assert_eq!(store.incident_arcs("A").len(), 3);
    }

    #[test]
    fn test_self_loop_counts_once() {
        let mut store = abc();
        store.add_arc(ArcData::new("aa"), "A", "A").unwrap();

        assert_eq!(store.degree("A"), 1);
        assert_eq!(store.in_degree("A"), 1);
        assert_eq!(store.out_degree("A"), 1);
        assert_eq!(ids(store.neighbors("A")), vec!["A"]);
        assert_eq!(store.incident_arcs("A").len(), 1);
        assert!(store.is_consistent());

        store.remove_arc("aa").unwrap();
        assert_eq!(store.degree("A"), 0);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_duplicate_node_leaves_store_unchanged() {
        let mut store = abc();
        store.add_arc(ArcData::new("ab"), "A", "B").unwrap();

        let err = store
            .add_node(NodeData::at("A", 5.0, 5.0).with_content("other"))
            .unwrap_err();
        assert_eq!(err, GraphError::duplicate_node("A"));
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.arc_count(), 1);
        assert_eq!(store.get_node("A").unwrap().content, "");
        assert_eq!(store.degree("A"), 1);
    }

    #[test]
    fn test_arc_rejections_are_atomic() {
        let mut store = abc();
        store.add_arc(ArcData::new("ab"), "A", "B").unwrap();

        assert_eq!(
            store.add_arc(ArcData::new("ab"), "B", "C"),
            Err(GraphError::duplicate_arc("ab"))
        );
        assert_eq!(
            store.add_arc(ArcData::new("az"), "A", "Z"),
            Err(GraphError::missing_endpoint("az", "Z"))
        );
        assert_eq!(
            store.add_arc(ArcData::new("za"), "Z", "A"),
            Err(GraphError::missing_endpoint("za", "Z"))
        );

        assert_eq!(store.arc_count(), 1);
        assert_eq!(store.get_arc("ab").unwrap().destination(), "B");
        assert_eq!(store.degree("A"), 1);
        assert_eq!(store.degree("C"), 0);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut store = abc();
        store.add_arc(ArcData::new("ab"), "A", "B").unwrap();
        store.add_arc(ArcData::new("ca"), "C", "A").unwrap();
        store.add_arc(ArcData::new("bc"), "B", "C").unwrap();
        store.add_arc(ArcData::new("aa"), "A", "A").unwrap();

        let removed = store.remove_node("A").unwrap();
        assert_eq!(removed.node.id(), "A");
        let mut arc_ids: Vec<_> = removed.arcs.iter().map(ArcData::id).collect();
        arc_ids.sort();
        assert_eq!(arc_ids, vec!["aa", "ab", "ca"]);

        assert!(!store.contains_node("A"));
        assert!(!store.contains_arc("ab"));
        assert!(!store.contains_arc("ca"));
        assert!(store.contains_arc("bc"));
        assert_eq!(store.degree("B"), 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remove_missing() {
        let mut store = abc();
        assert_eq!(
            store.remove_node("Z"),
            Err(GraphError::node_not_found("Z"))
        );
        assert!(store.remove_arc("nope").is_none());
        assert_eq!(store.node_count(), 3);
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut store = GraphStore::new();
        for id in ["C", "A", "D", "B"] {
            store.add_node(NodeData::new(id)).unwrap();
        }
        store.remove_node("A").unwrap();

        let order: Vec<_> = store.node_ids().collect();
        assert_eq!(order, vec!["C", "D", "B"]);
        assert_eq!(store.node_index("D"), Some(1));
    }

    #[test]
    fn test_snapshot_round_trip_keeps_topology() {
        let mut store = abc();
        store
            .add_arc(ArcData::new("ab").with_label("x"), "A", "B")
            .unwrap();
        store.add_arc(ArcData::new("bc"), "B", "C").unwrap();

        let restored = GraphStore::from_snapshot(store.snapshot()).unwrap();
        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.arc_count(), 2);
        assert_eq!(restored.get_arc("ab").unwrap().label.as_deref(), Some("x"));
        assert_eq!(restored.degree("B"), 2);
        assert!(restored.is_consistent());
    }

    #[test]
    fn test_from_snapshot_rejects_dangling_arc() {
        let mut snapshot = abc().snapshot();
        snapshot.arcs.push(ArcSnapshot {
            id: "az".to_string(),
            source: "A".to_string(),
            destination: "Z".to_string(),
            label: None,
            kind: String::new(),
        });
        assert_eq!(
            GraphStore::from_snapshot(snapshot).unwrap_err(),
            GraphError::missing_endpoint("az", "Z")
        );
    }
}
