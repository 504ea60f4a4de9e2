//! Index consistency tests for GraphStore
//!
//! Random mutation sequences must never leave the node, arc and adjacency
//! indexes disagreeing, and rejected mutations must not change anything.

use graph_explorer::{ArcData, GraphError, GraphStore, NodeData};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddNode(u8),
    AddArc(u8, u8, u8),
    RemoveNode(u8),
    RemoveArc(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::AddNode),
        (0u8..8, 0u8..6, 0u8..6).prop_map(|(a, s, d)| Op::AddArc(a, s, d)),
        (0u8..6).prop_map(Op::RemoveNode),
        (0u8..8).prop_map(Op::RemoveArc),
    ]
}

fn node_id(n: u8) -> String {
    format!("n{}", n)
}

fn arc_id(n: u8) -> String {
    format!("a{}", n)
}

proptest! {
    #[test]
    fn prop_random_mutations_keep_indexes_consistent(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = GraphStore::new();

        for op in ops {
            let nodes_before = store.node_count();
            let arcs_before = store.arc_count();

            match op {
                Op::AddNode(n) => {
                    let existed = store.contains_node(&node_id(n));
                    let result = store.add_node(NodeData::new(node_id(n)));
                    prop_assert_eq!(result.is_err(), existed);
                }
                Op::AddArc(a, s, d) => {
                    let valid = !store.contains_arc(&arc_id(a))
                        && store.contains_node(&node_id(s))
                        && store.contains_node(&node_id(d));
                    let result = store.add_arc(ArcData::new(arc_id(a)), &node_id(s), &node_id(d));
                    prop_assert_eq!(result.is_ok(), valid);
                    if result.is_err() {
                        prop_assert_eq!(store.arc_count(), arcs_before);
                    }
                }
                Op::RemoveNode(n) => {
                    let degree = store.degree(&node_id(n));
                    match store.remove_node(&node_id(n)) {
                        Ok(removed) => {
                            prop_assert_eq!(store.node_count(), nodes_before - 1);
                            prop_assert_eq!(store.arc_count(), arcs_before - removed.arcs.len());
                            prop_assert_eq!(removed.arcs.len(), degree);
                        }
                        Err(e) => {
                            prop_assert!(e.is_not_found());
                            prop_assert_eq!(store.node_count(), nodes_before);
                        }
                    }
                }
                Op::RemoveArc(a) => {
                    let existed = store.contains_arc(&arc_id(a));
                    prop_assert_eq!(store.remove_arc(&arc_id(a)).is_some(), existed);
                }
            }

            prop_assert!(store.is_consistent());
            for arc in store.arcs() {
                prop_assert!(store.contains_node(arc.source()));
                prop_assert!(store.contains_node(arc.destination()));
            }
        }
    }
}

#[test]
fn test_parallel_arcs_are_distinct() {
    let mut store = GraphStore::new();
    store.add_node(NodeData::new("A")).unwrap();
    store.add_node(NodeData::new("B")).unwrap();
    store.add_arc(ArcData::new("e1"), "A", "B").unwrap();
    store.add_arc(ArcData::new("e2"), "A", "B").unwrap();
    store.add_arc(ArcData::new("e3"), "B", "A").unwrap();

    assert_eq!(store.degree("A"), 3);
    assert_eq!(store.out_degree("A"), 2);
    assert_eq!(store.in_degree("A"), 1);
    assert_eq!(store.neighbors("A").len(), 1);

    store.remove_arc("e1");
    assert_eq!(store.degree("A"), 2);
    assert!(store.is_consistent());
}

#[test]
fn test_rejected_arc_leaves_store_untouched() {
    let mut store = GraphStore::new();
    store.add_node(NodeData::new("A")).unwrap();
    store.add_arc(ArcData::new("loop"), "A", "A").unwrap();

    assert_eq!(
        store.add_arc(ArcData::new("loop"), "A", "A"),
        Err(GraphError::duplicate_arc("loop"))
    );
    assert_eq!(
        store.add_arc(ArcData::new("e"), "A", "Z"),
        Err(GraphError::missing_endpoint("e", "Z"))
    );
    assert_eq!(
        store.add_arc(ArcData::new("e"), "Y", "A"),
        Err(GraphError::missing_endpoint("e", "Y"))
    );

    assert_eq!(store.arc_count(), 1);
    assert_eq!(store.degree("A"), 1);
    assert!(!store.contains_arc("e"));
    assert!(store.is_consistent());
}

#[test]
fn test_cascade_removal_of_hub() {
    let mut store = GraphStore::new();
    for id in ["hub", "a", "b", "c"] {
        store.add_node(NodeData::new(id)).unwrap();
    }
    store.add_arc(ArcData::new("1"), "hub", "a").unwrap();
    store.add_arc(ArcData::new("2"), "b", "hub").unwrap();
    store.add_arc(ArcData::new("3"), "hub", "hub").unwrap();
    store.add_arc(ArcData::new("4"), "a", "c").unwrap();

    let removed = store.remove_node("hub").unwrap();
    let mut arc_ids: Vec<&str> = removed.arcs.iter().map(ArcData::id).collect();
    arc_ids.sort();
    assert_eq!(arc_ids, vec!["1", "2", "3"]);

    assert_eq!(store.arc_count(), 1);
    assert_eq!(store.degree("a"), 1);
    assert_eq!(store.degree("b"), 0);
    assert!(store.is_consistent());
}

#[test]
fn test_snapshot_round_trip_preserves_order_and_attributes() {
    let mut store = GraphStore::new();
    store
        .add_node(NodeData::at("z", 1.0, 2.0).with_content("<b>z</b>"))
        .unwrap();
    store.add_node(NodeData::at("a", 3.0, 4.0).with_kind("person")).unwrap();
    store
        .add_arc(ArcData::new("za").with_label("knows"), "z", "a")
        .unwrap();

    let json = store.snapshot().to_json().unwrap();
    let restored =
        GraphStore::from_snapshot(graph_explorer::GraphSnapshot::from_json(&json).unwrap())
            .unwrap();

    let ids: Vec<&str> = restored.node_ids().collect();
    assert_eq!(ids, vec!["z", "a"]);
    assert_eq!(restored.get_node("z").unwrap().content, "<b>z</b>");
    assert_eq!(restored.get_node("a").unwrap().kind, "person");
    assert_eq!(
        restored.get_arc("za").unwrap().label.as_deref(),
        Some("knows")
    );
    assert_eq!(restored.source("za").unwrap().id(), "z");
    assert!(restored.is_consistent());
}
